// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stage control service.
//!
//! Runs the proportional tracking controller: while tracking is enabled it
//! polls the live stage position, compares it against the latest target from
//! the vision stage, and drives the stage toward the target. The previous
//! commanded direction is remembered per axis because the vendor drive
//! primitive must stop the prior movement before starting a new one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, info, warn};

use stagetrack_hal::{StageActuator, StagePositionProvider};
use stagetrack_structures::{
    AxisDirection, LatestValueCell, OperatorFlags, StageCoordinate, StageTarget, StageTrackError,
};

use crate::DiagnosticCells;

/// Tunables of the control service, taken from configuration at wiring time.
#[derive(Debug, Clone, Copy)]
pub struct ControlSettings {
    /// Velocity issued per unit of position error
    pub gain: f64,
    /// Delay between position polls / drive commands
    pub poll_interval: Duration,
    /// Wait applied on tracking toggle-off so an in-flight command finishes
    /// its direction bookkeeping before the stop is issued
    pub settle_delay: Duration,
}

/// Where the controller currently is in its tracking lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Tracking disabled
    Idle,
    /// Tracking enabled, waiting for a valid target
    Armed,
    /// Tracking enabled, actively driving toward the latest target
    Tracking,
    /// An invalid target was received; stage halted until re-armed
    Stopped,
}

/// The actuator and its direction bookkeeping, locked together so the
/// direction update strictly follows the drive command it belongs to.
struct ActuatorBlock {
    actuator: Box<dyn StageActuator>,
    prev_x_direction: AxisDirection,
    prev_y_direction: AxisDirection,
}

impl ActuatorBlock {
    fn drive(&mut self, x_velocity: f64, y_velocity: f64) -> Result<(), StageTrackError> {
        self.actuator.drive(
            x_velocity,
            y_velocity,
            self.prev_x_direction,
            self.prev_y_direction,
        )?;
        // Book directions after every issued command, zero-velocity included
        self.prev_x_direction = AxisDirection::from_velocity(x_velocity);
        self.prev_y_direction = AxisDirection::from_velocity(y_velocity);
        Ok(())
    }
}

/// State shared between the control thread and the public operations.
struct ControlShared {
    actuator: Mutex<ActuatorBlock>,
    state: Mutex<ControlState>,
    /// Fault recorded by the loop, surfaced on the next public call
    last_fault: Mutex<Option<StageTrackError>>,
}

impl ControlShared {
    fn drive(&self, x_velocity: f64, y_velocity: f64) -> Result<(), StageTrackError> {
        let mut block = self.actuator.lock().unwrap_or_else(PoisonError::into_inner);
        block.drive(x_velocity, y_velocity)
    }

    fn get_state(&self) -> ControlState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, next: ControlState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != next {
            debug!("[CONTROL] State {:?} -> {:?}", *state, next);
            *state = next;
        }
    }

    fn record_fault(&self, fault: StageTrackError) {
        let mut slot = self
            .last_fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(fault);
    }

    fn take_fault(&self) -> Option<StageTrackError> {
        let mut slot = self
            .last_fault
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }
}

/// Control service managing the tracking thread.
pub struct StageControlLoop {
    /// Position handle, held until `start` moves it into the thread
    position: Option<Box<dyn StagePositionProvider>>,

    /// Shared operator flags (owns reads of the tracking toggle)
    flags: Arc<OperatorFlags>,

    /// Cell fed by the vision stage
    target_input: LatestValueCell<StageTarget>,

    /// Display cells (pose publishing)
    diagnostics: DiagnosticCells,

    settings: ControlSettings,

    shared: Arc<ControlShared>,

    /// Running flag
    running: Arc<AtomicBool>,

    /// Thread handle
    thread: Option<JoinHandle<()>>,
}

impl StageControlLoop {
    /// Create the control service and connect to the stage.
    ///
    /// `connect` is called exactly once here, before any drive command can
    /// be issued.
    pub fn new(
        mut actuator: Box<dyn StageActuator>,
        position: Box<dyn StagePositionProvider>,
        flags: Arc<OperatorFlags>,
        target_input: LatestValueCell<StageTarget>,
        diagnostics: DiagnosticCells,
        settings: ControlSettings,
    ) -> Result<StageControlLoop, StageTrackError> {
        actuator.connect()?;

        Ok(StageControlLoop {
            position: Some(position),
            flags,
            target_input,
            diagnostics,
            settings,
            shared: Arc::new(ControlShared {
                actuator: Mutex::new(ActuatorBlock {
                    actuator,
                    prev_x_direction: AxisDirection::Positive,
                    prev_y_direction: AxisDirection::Positive,
                }),
                state: Mutex::new(ControlState::Idle),
                last_fault: Mutex::new(None),
            }),
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        })
    }

    /// Start the control service
    pub fn start(&mut self) -> Result<(), StageTrackError> {
        if self.running.load(Ordering::Relaxed) {
            return Err(StageTrackError::BadParameters(
                "Control service already running".to_string(),
            ));
        }

        let position = self.position.take().ok_or_else(|| {
            StageTrackError::InternalError("Control service cannot be restarted".to_string())
        })?;

        self.running.store(true, Ordering::Relaxed);

        let running = Arc::clone(&self.running);
        let flags = Arc::clone(&self.flags);
        let shared = Arc::clone(&self.shared);
        let target_input = self.target_input.clone();
        let diagnostics = self.diagnostics.clone();
        let settings = self.settings;

        let thread = thread::spawn(move || {
            debug!("[CONTROL] Service started");
            let mut last_target: Option<StageCoordinate> = None;

            while running.load(Ordering::Relaxed) {
                let pose = StageCoordinate::new(position.get_x(), position.get_y());
                // Published every cycle regardless of tracking state
                diagnostics.stage_pose.publish(pose.rounded_to_tenth());

                run_control_cycle(&flags, &shared, &target_input, &settings, pose, &mut last_target);

                thread::sleep(settings.poll_interval);
            }

            debug!("[CONTROL] Service stopped");
        });

        self.thread = Some(thread);
        Ok(())
    }

    /// Enable or disable tracking.
    ///
    /// Disabling waits out the settle delay, then issues a zero-velocity
    /// stop; an actuator failure there propagates to the caller. A fault the
    /// loop recorded since the last public call is surfaced first, before
    /// the requested change is applied.
    pub fn set_tracking_enabled(&self, enabled: bool) -> Result<(), StageTrackError> {
        if let Some(fault) = self.shared.take_fault() {
            return Err(fault);
        }

        if enabled {
            self.flags.set_tracking_enabled(true);
            info!("[CONTROL] Tracking loop enabled");
            Ok(())
        } else {
            self.flags.set_tracking_enabled(false);
            info!("[CONTROL] Tracking loop paused");
            // Let an in-flight drive command land its direction update
            thread::sleep(self.settings.settle_delay);
            self.shared.drive(0.0, 0.0)
        }
    }

    /// Flip the tracking toggle, returning the new state.
    pub fn toggle_tracking(&self) -> Result<bool, StageTrackError> {
        let enabled = !self.flags.is_tracking_enabled();
        self.set_tracking_enabled(enabled)?;
        Ok(enabled)
    }

    /// Issue a drive command directly, with direction bookkeeping.
    ///
    /// Exposed for operator-driven jogging and shutdown stops; the tracking
    /// loop uses the same path internally.
    pub fn drive_stage(&self, x_velocity: f64, y_velocity: f64) -> Result<(), StageTrackError> {
        self.shared.drive(x_velocity, y_velocity)
    }

    pub fn get_state(&self) -> ControlState {
        self.shared.get_state()
    }

    /// The per-axis directions of the most recently issued command.
    pub fn get_previous_directions(&self) -> (AxisDirection, AxisDirection) {
        let block = self
            .shared
            .actuator
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        (block.prev_x_direction, block.prev_y_direction)
    }

    /// Take the fault recorded by the loop, if any, without toggling.
    pub fn take_last_fault(&self) -> Option<StageTrackError> {
        self.shared.take_fault()
    }

    /// Stop the control service and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("[CONTROL] Service thread panicked during shutdown");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Drop for StageControlLoop {
    fn drop(&mut self) {
        self.stop();
        // Never leave the stage in motion on teardown
        if let Err(e) = self.shared.drive(0.0, 0.0) {
            warn!("[CONTROL] Final stop command failed: {}", e);
        }
    }
}

/// One pass of the control state machine.
fn run_control_cycle(
    flags: &OperatorFlags,
    shared: &ControlShared,
    target_input: &LatestValueCell<StageTarget>,
    settings: &ControlSettings,
    pose: StageCoordinate,
    last_target: &mut Option<StageCoordinate>,
) {
    let state = shared.get_state();

    if !flags.is_tracking_enabled() {
        // Toggle-off is the cancellation path; the stop command itself is
        // issued synchronously by the toggle operation.
        *last_target = None;
        shared.set_state(ControlState::Idle);
        return;
    }

    let next = match state {
        ControlState::Idle => {
            // Freshly armed; an already-published valid target promotes on
            // the next cycle.
            ControlState::Armed
        }
        ControlState::Armed | ControlState::Tracking => match target_input.take_latest() {
            Some(StageTarget::Position(coordinate)) => {
                *last_target = Some(coordinate);
                ControlState::Tracking
            }
            Some(StageTarget::Invalid) => {
                // Segmentation failure signal: exactly one zero-velocity
                // stop, then stay silent until the operator re-arms.
                warn!("[CONTROL] Invalid target received, halting stage");
                *last_target = None;
                if let Err(e) = shared.drive(0.0, 0.0) {
                    error!("[CONTROL] Stop command failed: {}", e);
                    flags.set_tracking_enabled(false);
                    shared.record_fault(e);
                    ControlState::Idle
                } else {
                    ControlState::Stopped
                }
            }
            None => state,
        },
        ControlState::Stopped => {
            // Targets published while stopped are drained and discarded;
            // only a re-arm leaves this state.
            let _ = target_input.take_latest();
            ControlState::Stopped
        }
    };

    if next == ControlState::Tracking {
        if let Some(target) = *last_target {
            let x_velocity = settings.gain * (target.x - pose.x);
            let y_velocity = settings.gain * (target.y - pose.y);
            if let Err(e) = shared.drive(x_velocity, y_velocity) {
                // Surfaced to the operator through the next public call; the
                // loop itself never retries.
                error!("[CONTROL] Drive command failed: {}", e);
                flags.set_tracking_enabled(false);
                shared.record_fault(e);
                *last_target = None;
                shared.set_state(ControlState::Idle);
                return;
            }
        }
    }

    shared.set_state(next);
}
