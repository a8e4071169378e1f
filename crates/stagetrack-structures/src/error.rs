use std::error::Error;
use std::fmt::{Display, Formatter};

/// Common error type for stagetrack operations.
///
/// Covers parameter validation, vision-path faults, and hardware faults
/// across the tracking pipeline.
///
/// # Examples
/// ```
/// use stagetrack_structures::StageTrackError;
///
/// fn validate_crop(size: u32) -> Result<(), StageTrackError> {
///     if size == 0 {
///         return Err(StageTrackError::BadParameters("Crop size must be > 0".into()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_crop(0).is_err());
/// assert!(validate_crop(770).is_ok());
/// ```
#[derive(Debug)]
pub enum StageTrackError {
    /// Invalid parameters provided to a function
    BadParameters(String),
    /// Error in the segmentation / centroid / mapping path
    VisionFault(String),
    /// A hardware collaborator (camera or stage) refused or failed an operation
    HardwareFault(String),
    /// Internal error indicating a bug (please report)
    InternalError(String),
}

impl Display for StageTrackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StageTrackError::BadParameters(msg) => write!(f, "Bad Parameters: {}", msg),
            StageTrackError::VisionFault(msg) => write!(f, "Vision Fault: {}", msg),
            StageTrackError::HardwareFault(msg) => write!(f, "Hardware Fault: {}", msg),
            StageTrackError::InternalError(msg) => write!(
                f,
                "Internal Error, please raise an issue on Github: {}",
                msg
            ),
        }
    }
}
impl Error for StageTrackError {}
