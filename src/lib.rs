//! # stagetrack - Closed-Loop Microscope Stage Tracking
//!
//! stagetrack keeps a moving object centered under a microscope objective:
//! it continuously grabs frames, segments the tracking region to find the
//! object's centroid, converts that centroid into stage coordinates, and
//! drives the stage velocity to recenter the object - in real time,
//! indefinitely.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! stagetrack = "0.1"  # Default: simulated hardware backends included
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use stagetrack::prelude::*;
//!
//! # fn main() -> Result<(), stagetrack::structures::StageTrackError> {
//! let config = stagetrack::config::TrackerConfig::default();
//! let flags = Arc::new(OperatorFlags::new());
//! let diagnostics = DiagnosticCells::new();
//! let frames = LatestValueCell::new();
//! let targets = LatestValueCell::new();
//!
//! let stage = SimulatedStage::new();
//! let source = SimulatedFrameSource::new(2048, 1024);
//!
//! let mut acquisition = AcquisitionLoop::new(
//!     Box::new(source), Arc::clone(&flags), frames.clone(), diagnostics.clone());
//! let mut vision = VisionLoop::new(
//!     Box::new(stage.clone()), Arc::clone(&flags), frames, targets.clone(),
//!     diagnostics.clone(),
//!     VisionSettings {
//!         crop_size: config.optics.crop_size,
//!         interval: Duration::from_millis(config.vision.segmentation_interval_ms),
//!         mapper: PixelToStageMapper::new_uniform(config.optics.pixel_to_stage_scale),
//!     });
//! let mut control = StageControlLoop::new(
//!     Box::new(stage.clone()), Box::new(stage), Arc::clone(&flags),
//!     targets, diagnostics,
//!     ControlSettings {
//!         gain: config.control.gain,
//!         poll_interval: Duration::from_millis(config.control.poll_interval_ms),
//!         settle_delay: Duration::from_millis(config.control.settle_delay_ms),
//!     })?;
//!
//! acquisition.start()?;
//! vision.start()?;
//! control.start()?;
//! control.set_tracking_enabled(true)?;
//! # Ok(()) }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: stagetrack-structures, stagetrack-config   │
//! │  (frames, masks, latest-value cells, flags, TOML)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Processing: stagetrack-vision                          │
//! │  (thresholding, centroid, pixel-to-stage mapping)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  I/O: stagetrack-hal                                    │
//! │  (camera and stage contracts, simulated backends)       │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Runtime: stagetrack-runtime                            │
//! │  (acquisition / vision / control thread services)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Stages hand data forward through single-slot latest-value cells: a new
//! publish overwrites whatever was not yet read, so every consumer always
//! works on the freshest data and backlogs cannot form.
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use stagetrack_config as config;
pub use stagetrack_structures as structures;

// Re-export processing
pub use stagetrack_vision as vision;

// Re-export I/O layer
pub use stagetrack_hal as hal;

// Re-export runtime services
pub use stagetrack_runtime as runtime;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::structures::{
        AxisDirection, LatestValueCell, OperatorFlags, PanelSide, PixelFrame, SegmentationMask,
        StageCoordinate, StageTarget, StageTrackError,
    };

    pub use crate::vision::{PixelToStageMapper, CANONICAL_REGION_SIZE};

    pub use crate::hal::{FrameSource, StageActuator, StagePositionProvider};

    #[cfg(feature = "hal-simulated")]
    pub use crate::hal::{SimulatedFrameSource, SimulatedStage};

    pub use crate::runtime::{
        AcquisitionLoop, ControlSettings, ControlState, DiagnosticCells, StageControlLoop,
        VisionLoop, VisionSettings,
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        // Just test that re-exports work
        use crate::prelude::*;
        let _direction = AxisDirection::from_velocity(1.0);
        let _config = crate::config::TrackerConfig::default();
    }
}
