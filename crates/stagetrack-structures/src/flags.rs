use std::sync::atomic::{AtomicBool, Ordering};

use crate::PanelSide;

/// Operator-owned mode flags shared across the pipeline stages.
///
/// Each flag has exactly one writer (the operator-facing toggle) and one
/// reading stage: tracking is read by the control stage, panel and inversion
/// by the vision stage, capture timing by the acquisition stage. Stages never
/// mutate one another's flags. One instance is created at wiring time and
/// handed to every stage behind an `Arc`.
#[derive(Debug)]
pub struct OperatorFlags {
    tracking_enabled: AtomicBool,
    track_right_panel: AtomicBool,
    inverted_thresholding: AtomicBool,
    report_capture_time: AtomicBool,
}

impl OperatorFlags {
    /// Creates the flag block with startup defaults: tracking off, right
    /// panel active, standard thresholding, capture timing off.
    pub fn new() -> OperatorFlags {
        OperatorFlags {
            tracking_enabled: AtomicBool::new(false),
            track_right_panel: AtomicBool::new(true),
            inverted_thresholding: AtomicBool::new(false),
            report_capture_time: AtomicBool::new(false),
        }
    }

    pub fn is_tracking_enabled(&self) -> bool {
        self.tracking_enabled.load(Ordering::Relaxed)
    }

    pub fn set_tracking_enabled(&self, enabled: bool) {
        self.tracking_enabled.store(enabled, Ordering::Relaxed);
    }

    /// Flips the tracking flag and returns the new state.
    pub fn toggle_tracking(&self) -> bool {
        !self.tracking_enabled.fetch_xor(true, Ordering::Relaxed)
    }

    /// The frame half currently selected as the tracking region.
    pub fn get_active_panel(&self) -> PanelSide {
        if self.track_right_panel.load(Ordering::Relaxed) {
            PanelSide::Right
        } else {
            PanelSide::Left
        }
    }

    /// Switches the active panel and returns the newly selected side.
    pub fn toggle_panel(&self) -> PanelSide {
        self.track_right_panel.fetch_xor(true, Ordering::Relaxed);
        self.get_active_panel()
    }

    pub fn is_inverted_thresholding(&self) -> bool {
        self.inverted_thresholding.load(Ordering::Relaxed)
    }

    /// Flips between standard and inverted thresholding, returning the new state.
    pub fn toggle_inverted_thresholding(&self) -> bool {
        !self.inverted_thresholding.fetch_xor(true, Ordering::Relaxed)
    }

    pub fn is_capture_timing_enabled(&self) -> bool {
        self.report_capture_time.load(Ordering::Relaxed)
    }

    /// Flips capture-latency reporting, returning the new state.
    pub fn toggle_capture_timing(&self) -> bool {
        !self.report_capture_time.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Default for OperatorFlags {
    fn default() -> Self {
        Self::new()
    }
}
