// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Frame acquisition service.
//!
//! Continuously pulls frames from the frame source, applies the camera
//! orientation correction, and publishes the result to the vision stage and
//! the display. There is no backpressure: slower consumers simply observe
//! the latest frame and skip the ones they missed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

use stagetrack_hal::FrameSource;
use stagetrack_structures::{LatestValueCell, OperatorFlags, PixelFrame, StageTrackError};

use crate::DiagnosticCells;

/// Acquisition service managing the frame grab thread.
pub struct AcquisitionLoop {
    /// Frame source, held until `start` moves it into the thread
    source: Option<Box<dyn FrameSource>>,

    /// Shared operator flags (reads the capture-timing toggle)
    flags: Arc<OperatorFlags>,

    /// Cell consumed by the vision stage
    frame_output: LatestValueCell<PixelFrame>,

    /// Display cells
    diagnostics: DiagnosticCells,

    /// Running flag
    running: Arc<AtomicBool>,

    /// Thread handle
    thread: Option<JoinHandle<()>>,
}

impl AcquisitionLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        flags: Arc<OperatorFlags>,
        frame_output: LatestValueCell<PixelFrame>,
        diagnostics: DiagnosticCells,
    ) -> AcquisitionLoop {
        AcquisitionLoop {
            source: Some(source),
            flags,
            frame_output,
            diagnostics,
            running: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }

    /// Start the acquisition service
    ///
    /// Refuses to start while the frame source's live mode is off, since
    /// capture would fail every cycle.
    pub fn start(&mut self) -> Result<(), StageTrackError> {
        if self.running.load(Ordering::Relaxed) {
            return Err(StageTrackError::BadParameters(
                "Acquisition service already running".to_string(),
            ));
        }

        let mut source = self.source.take().ok_or_else(|| {
            StageTrackError::InternalError("Acquisition service cannot be restarted".to_string())
        })?;

        if !source.is_live_mode_on() {
            self.source = Some(source);
            return Err(StageTrackError::HardwareFault(
                "Turn on the livestream before starting acquisition!".to_string(),
            ));
        }

        self.running.store(true, Ordering::Relaxed);

        let running = Arc::clone(&self.running);
        let flags = Arc::clone(&self.flags);
        let frame_output = self.frame_output.clone();
        let diagnostics = self.diagnostics.clone();

        let thread = thread::spawn(move || {
            debug!("[ACQUISITION] Service started");

            while running.load(Ordering::Relaxed) {
                let started = Instant::now();
                let captured = source.capture();
                let capture_time = started.elapsed();

                match captured {
                    Ok(mut frame) => {
                        if flags.is_capture_timing_enabled() {
                            info!("[ACQUISITION] Image capture time: {:?}", capture_time);
                        }
                        // Camera y-axis runs opposite to the stage axis
                        frame.flip_vertical();
                        diagnostics.raw_frame.publish(frame.clone());
                        frame_output.publish(frame);
                    }
                    Err(e) => {
                        // Fatal to this cycle only
                        warn!("[ACQUISITION] Frame capture failed, skipping cycle: {}", e);
                    }
                }
            }

            debug!("[ACQUISITION] Service stopped");
        });

        self.thread = Some(thread);
        Ok(())
    }

    /// Stop the acquisition service and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("[ACQUISITION] Service thread panicked during shutdown");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Drop for AcquisitionLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
