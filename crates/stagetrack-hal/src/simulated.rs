// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Software-only hardware backends for detached operation.
//!
//! The simulated frame source renders a bright square drifting across an
//! otherwise dark sensor; the simulated stage integrates commanded
//! velocities into a live position. Together they close the tracking loop
//! with no hardware attached.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use ndarray::Array2;
use tracing::debug;

use stagetrack_structures::{AxisDirection, PixelFrame, StageTrackError};

use crate::{FrameSource, StageActuator, StagePositionProvider};

/// Synthetic camera: a bright square target on a dark field.
///
/// The target drifts at a fixed pixel velocity and bounces off the frame
/// edges, giving the pipeline something to chase indefinitely.
#[derive(Debug)]
pub struct SimulatedFrameSource {
    width: u32,
    height: u32,
    live: bool,
    capture_delay: Duration,
    block_size: u32,
    center_x: f64,
    center_y: f64,
    velocity_x: f64,
    velocity_y: f64,
}

impl SimulatedFrameSource {
    /// Creates a source producing `width` x `height` frames with the target
    /// parked at the center of the right panel.
    pub fn new(width: u32, height: u32) -> SimulatedFrameSource {
        SimulatedFrameSource {
            width,
            height,
            live: true,
            capture_delay: Duration::ZERO,
            block_size: 48,
            center_x: width as f64 * 0.75,
            center_y: height as f64 * 0.5,
            velocity_x: 0.0,
            velocity_y: 0.0,
        }
    }

    /// Blocks each capture for `delay`, mimicking hardware readout time.
    pub fn with_capture_delay(mut self, delay: Duration) -> SimulatedFrameSource {
        self.capture_delay = delay;
        self
    }

    /// Places the target at `(center_x, center_y)` with the given side length.
    pub fn with_target(
        mut self,
        center_x: f64,
        center_y: f64,
        block_size: u32,
    ) -> SimulatedFrameSource {
        self.center_x = center_x;
        self.center_y = center_y;
        self.block_size = block_size;
        self
    }

    /// Drifts the target by `(dx, dy)` pixels per captured frame.
    pub fn with_target_velocity(mut self, dx: f64, dy: f64) -> SimulatedFrameSource {
        self.velocity_x = dx;
        self.velocity_y = dy;
        self
    }

    fn advance_target(&mut self) {
        let margin = self.block_size as f64;
        self.center_x += self.velocity_x;
        self.center_y += self.velocity_y;

        if self.center_x < margin || self.center_x > self.width as f64 - margin {
            self.velocity_x = -self.velocity_x;
            self.center_x = self.center_x.clamp(margin, self.width as f64 - margin);
        }
        if self.center_y < margin || self.center_y > self.height as f64 - margin {
            self.velocity_y = -self.velocity_y;
            self.center_y = self.center_y.clamp(margin, self.height as f64 - margin);
        }
    }

    fn render(&self) -> PixelFrame {
        let mut pixels = Array2::<u8>::zeros((self.height as usize, self.width as usize));
        let half = (self.block_size / 2) as i64;
        let cx = self.center_x as i64;
        let cy = self.center_y as i64;

        for y in (cy - half).max(0)..(cy + half).min(self.height as i64) {
            for x in (cx - half).max(0)..(cx + half).min(self.width as i64) {
                pixels[(y as usize, x as usize)] = 255;
            }
        }
        PixelFrame::from_array(pixels)
    }
}

impl FrameSource for SimulatedFrameSource {
    fn capture(&mut self) -> Result<PixelFrame, StageTrackError> {
        if !self.live {
            return Err(StageTrackError::HardwareFault(
                "Cannot snap an image while live mode is off!".into(),
            ));
        }
        if !self.capture_delay.is_zero() {
            thread::sleep(self.capture_delay);
        }
        self.advance_target();
        Ok(self.render())
    }

    fn is_live_mode_on(&self) -> bool {
        self.live
    }

    fn set_live_mode_on(&mut self, enabled: bool) {
        self.live = enabled;
    }

    fn set_roi(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<(), StageTrackError> {
        if width == 0 || height == 0 {
            return Err(StageTrackError::BadParameters(format!(
                "ROI {}x{} at ({}, {}) has no area!",
                width, height, x, y
            )));
        }
        self.width = width;
        self.height = height;
        self.center_x = width as f64 * 0.75;
        self.center_y = height as f64 * 0.5;
        Ok(())
    }
}

struct SimulatedStageState {
    x: f64,
    y: f64,
    velocity_x: f64,
    velocity_y: f64,
    connected: bool,
    last_update: Instant,
    last_issued: Option<(AxisDirection, AxisDirection)>,
}

impl SimulatedStageState {
    /// Integrates the commanded velocity into the position up to now.
    fn advance(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_update).as_secs_f64();
        self.x += self.velocity_x * dt;
        self.y += self.velocity_y * dt;
        self.last_update = now;
    }
}

/// Software stage: integrates drive commands into a live position.
///
/// Cloned handles share one stage, so the position-provider side and the
/// actuator side of the control loop can both be wired to the same
/// simulated hardware. The vendor's previous-direction check is emulated:
/// a drive whose remembered directions disagree with the last issued
/// command fails, just as the real motion controller does.
#[derive(Clone)]
pub struct SimulatedStage {
    state: Arc<Mutex<SimulatedStageState>>,
}

impl SimulatedStage {
    pub fn new() -> SimulatedStage {
        SimulatedStage {
            state: Arc::new(Mutex::new(SimulatedStageState {
                x: 0.0,
                y: 0.0,
                velocity_x: 0.0,
                velocity_y: 0.0,
                connected: false,
                last_update: Instant::now(),
                last_issued: None,
            })),
        }
    }
}

impl Default for SimulatedStage {
    fn default() -> Self {
        Self::new()
    }
}

impl StagePositionProvider for SimulatedStage {
    fn get_x(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.advance();
        state.x
    }

    fn get_y(&self) -> f64 {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.advance();
        state.y
    }
}

impl StageActuator for SimulatedStage {
    fn connect(&mut self) -> Result<(), StageTrackError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.connected = true;
        debug!("[SIM-STAGE] Connected");
        Ok(())
    }

    fn drive(
        &mut self,
        x_velocity: f64,
        y_velocity: f64,
        prev_x_direction: AxisDirection,
        prev_y_direction: AxisDirection,
    ) -> Result<(), StageTrackError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !state.connected {
            return Err(StageTrackError::HardwareFault(
                "Drive command issued before connect!".into(),
            ));
        }

        if let Some((expected_x, expected_y)) = state.last_issued {
            if expected_x != prev_x_direction || expected_y != prev_y_direction {
                return Err(StageTrackError::HardwareFault(format!(
                    "Previous direction mismatch: stage expected {}/{} but was told {}/{}",
                    expected_x, expected_y, prev_x_direction, prev_y_direction
                )));
            }
        }

        state.advance();
        state.velocity_x = x_velocity;
        state.velocity_y = y_velocity;
        state.last_issued = Some((
            AxisDirection::from_velocity(x_velocity),
            AxisDirection::from_velocity(y_velocity),
        ));
        debug!(
            "[SIM-STAGE] Driving at ({:.3}, {:.3})",
            x_velocity, y_velocity
        );
        Ok(())
    }
}
