//! The core crate for stagetrack. Defines the most common data structures used throughout

mod error;
mod flags;
mod frame;
mod geometry;
mod latest;

pub use error::StageTrackError;
pub use flags::OperatorFlags;
pub use frame::{PixelFrame, SegmentationMask, MASK_FOREGROUND};
pub use geometry::{AxisDirection, PanelSide, PixelCoordinate, StageCoordinate, StageTarget};
pub use latest::LatestValueCell;
