// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Vision service.
//!
//! Consumes the latest acquired frame, crops the active panel, runs the
//! segmentation engine, and publishes a stage target plus diagnostic images.
//! A vision fault never escapes this loop: the stage sees an invalid target
//! and the display sees the error diagnostic image, and the next cycle
//! proceeds normally.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error, warn};

use stagetrack_hal::StagePositionProvider;
use stagetrack_structures::{
    LatestValueCell, OperatorFlags, PixelFrame, SegmentationMask, StageCoordinate, StageTarget,
    StageTrackError,
};
use stagetrack_vision::{
    error_diagnostic_image, segment_and_locate, PixelToStageMapper, VisionFailure,
    CANONICAL_REGION_SIZE,
};

use crate::DiagnosticCells;

/// Tunables of the vision service, taken from configuration at wiring time.
#[derive(Debug, Clone, Copy)]
pub struct VisionSettings {
    /// Side length of the square window cut from the active panel, in raw
    /// frame pixels
    pub crop_size: u32,
    /// Delay after each segmentation attempt
    pub interval: Duration,
    /// Calibrated pixel-to-stage conversion
    pub mapper: PixelToStageMapper,
}

/// Vision service managing the segmentation thread.
pub struct VisionLoop {
    /// Stage position handle for the coordinate mapper, held until `start`
    /// moves it into the thread
    position: Option<Box<dyn StagePositionProvider>>,

    /// Shared operator flags (reads panel and inversion toggles)
    flags: Arc<OperatorFlags>,

    /// Cell fed by the acquisition stage
    frame_input: LatestValueCell<PixelFrame>,

    /// Cell consumed by the control stage
    target_output: LatestValueCell<StageTarget>,

    /// Display cells
    diagnostics: DiagnosticCells,

    settings: VisionSettings,

    /// Running flag
    running: Arc<AtomicBool>,

    /// Thread handle
    thread: Option<JoinHandle<()>>,
}

impl VisionLoop {
    pub fn new(
        position: Box<dyn StagePositionProvider>,
        flags: Arc<OperatorFlags>,
        frame_input: LatestValueCell<PixelFrame>,
        target_output: LatestValueCell<StageTarget>,
        diagnostics: DiagnosticCells,
        settings: VisionSettings,
    ) -> VisionLoop {
        VisionLoop {
            position: Some(position),
            flags,
            frame_input,
            target_output,
            diagnostics,
            settings,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Start the vision service
    pub fn start(&mut self) -> Result<(), StageTrackError> {
        if self.running.load(Ordering::Relaxed) {
            return Err(StageTrackError::BadParameters(
                "Vision service already running".to_string(),
            ));
        }

        let position = self.position.take().ok_or_else(|| {
            StageTrackError::InternalError("Vision service cannot be restarted".to_string())
        })?;

        self.running.store(true, Ordering::Relaxed);

        let running = Arc::clone(&self.running);
        let flags = Arc::clone(&self.flags);
        let frame_input = self.frame_input.clone();
        let target_output = self.target_output.clone();
        let diagnostics = self.diagnostics.clone();
        let settings = self.settings;

        let thread = thread::spawn(move || {
            debug!("[VISION] Service started");

            while running.load(Ordering::Relaxed) {
                // Cap the segmentation rate independently of frame arrival
                thread::sleep(settings.interval);

                let Some(frame) = frame_input.take_latest() else {
                    continue;
                };

                match run_vision_cycle(&frame, &flags, &settings, position.as_ref()) {
                    Ok((target, mask, annotated)) => {
                        target_output.publish(target);
                        diagnostics.segmentation_mask.publish(mask);
                        diagnostics.annotated_view.publish(annotated);
                    }
                    Err(failure) => {
                        match &failure {
                            VisionFailure::EmptyMask => {
                                warn!("[VISION] Lighting conditions aren't good: no object found")
                            }
                            VisionFailure::Fault(e) => {
                                error!("[VISION] Segmentation cycle failed: {}", e)
                            }
                        }
                        let error_image = error_diagnostic_image();
                        diagnostics
                            .segmentation_mask
                            .publish(SegmentationMask::from_array(
                                error_image.get_internal_data().clone(),
                            ));
                        diagnostics.annotated_view.publish(error_image);
                        target_output.publish(StageTarget::Invalid);
                    }
                }
            }

            debug!("[VISION] Service stopped");
        });

        self.thread = Some(thread);
        Ok(())
    }

    /// Stop the vision service and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("[VISION] Service thread panicked during shutdown");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Drop for VisionLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One segmentation attempt: crop the active panel fresh from the newest
/// frame, segment it, and map the centroid against the live stage position.
fn run_vision_cycle(
    frame: &PixelFrame,
    flags: &OperatorFlags,
    settings: &VisionSettings,
    position: &dyn StagePositionProvider,
) -> Result<(StageTarget, SegmentationMask, PixelFrame), VisionFailure> {
    // The panel flag is read at use time, so a toggle applies to the very
    // next cycle without restarting anything.
    let region = frame
        .crop_panel(flags.get_active_panel(), settings.crop_size)
        .map_err(VisionFailure::Fault)?;

    let located = segment_and_locate(&region, flags.is_inverted_thresholding())?;

    let pose = StageCoordinate::new(position.get_x(), position.get_y());
    let target = settings.mapper.map(
        located.centroid,
        CANONICAL_REGION_SIZE,
        CANONICAL_REGION_SIZE,
        pose,
    );

    Ok((
        StageTarget::Position(target),
        located.mask,
        located.annotated,
    ))
}
