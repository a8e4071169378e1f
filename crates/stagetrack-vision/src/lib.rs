//! Segmentation engine and coordinate mapping for stagetrack.
//!
//! Everything in this crate is pure computation: cropped grayscale regions
//! in, masks / centroids / stage targets out. No hardware, no threads, no
//! shared state. The runtime crate owns scheduling and decides what to do
//! with failures.

use std::fmt::{Display, Formatter};

pub mod annotate;
pub mod centroid;
pub mod mapping;
pub mod segmentation;

pub use annotate::draw_centroid_marker;
pub use centroid::find_center;
pub use mapping::PixelToStageMapper;
pub use segmentation::{
    binary_thresholding, error_diagnostic_image, inverted_binary_thresholding,
    BRIGHT_OBJECT_QUANTILE, CANONICAL_REGION_SIZE, DARK_OBJECT_QUANTILE,
};

use stagetrack_structures::{PixelCoordinate, PixelFrame, SegmentationMask, StageTrackError};

/// A successfully located object within the canonical region.
#[derive(Debug, Clone)]
pub struct LocatedObject {
    /// Binary segmentation of the canonical region
    pub mask: SegmentationMask,
    /// Mask with the centroid marker ring drawn in
    pub annotated: PixelFrame,
    /// Centroid in canonical-region pixel coordinates
    pub centroid: PixelCoordinate,
}

/// Why a vision cycle produced no usable object.
///
/// `EmptyMask` is the ordinary "nothing bright enough in view" case (bad
/// lighting, object left the panel); `Fault` covers genuine processing
/// errors. Both make the vision stage publish the error diagnostic image and
/// an invalid target, but they are logged distinctly.
#[derive(Debug)]
pub enum VisionFailure {
    /// Segmentation found no foreground pixels at all
    EmptyMask,
    /// The segmentation / annotation path itself failed
    Fault(StageTrackError),
}

impl Display for VisionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VisionFailure::EmptyMask => write!(f, "Segmentation produced an empty mask"),
            VisionFailure::Fault(err) => write!(f, "Vision processing failed: {}", err),
        }
    }
}

impl std::error::Error for VisionFailure {}

/// Runs one full segmentation attempt over a cropped region.
///
/// Thresholds the region (standard or inverted per `inverted`), extracts the
/// centroid, and renders the annotated view. The caller maps the centroid to
/// stage space separately, since that needs the live stage position.
pub fn segment_and_locate(
    region: &PixelFrame,
    inverted: bool,
) -> Result<LocatedObject, VisionFailure> {
    let mask = if inverted {
        inverted_binary_thresholding(region)
    } else {
        binary_thresholding(region)
    }
    .map_err(VisionFailure::Fault)?;

    let centroid = find_center(&mask).ok_or(VisionFailure::EmptyMask)?;
    let annotated = draw_centroid_marker(&mask, centroid).map_err(VisionFailure::Fault)?;

    Ok(LocatedObject {
        mask,
        annotated,
        centroid,
    })
}
