use image::Luma;
use imageproc::drawing::draw_hollow_circle;

use stagetrack_structures::{
    PixelCoordinate, PixelFrame, SegmentationMask, StageTrackError, MASK_FOREGROUND,
};

/// Radius in pixels of the centroid marker ring.
pub const MARKER_RADIUS: i32 = 10;

/// Renders the mask with a hollow ring around the located centroid.
///
/// This is the operator-facing "where is the tracker looking" view; it is
/// published to the diagnostics sink alongside the raw mask.
pub fn draw_centroid_marker(
    mask: &SegmentationMask,
    centroid: PixelCoordinate,
) -> Result<PixelFrame, StageTrackError> {
    let canvas = mask.export_as_gray_image()?;
    let center = (centroid.x as i32, centroid.y as i32);

    // Two concentric rings approximate the original 2px stroke width.
    let annotated = draw_hollow_circle(&canvas, center, MARKER_RADIUS, Luma([MASK_FOREGROUND]));
    let annotated = draw_hollow_circle(&annotated, center, MARKER_RADIUS + 1, Luma([MASK_FOREGROUND]));

    PixelFrame::from_gray_image(&annotated)
}
