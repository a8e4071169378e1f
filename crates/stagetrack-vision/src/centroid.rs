use stagetrack_structures::{PixelCoordinate, SegmentationMask, MASK_FOREGROUND};

/// Finds the intensity-weighted center of mass of a binary mask.
///
/// The mask is normalized to {0, 1} weights before averaging and the result
/// is truncated to integer pixel coordinates, matching the downstream
/// expectation of whole-pixel centroids.
///
/// Returns `None` when the mask has no foreground at all. Callers must not
/// substitute (0, 0): "no object" and "object at the top-left corner" are
/// different situations.
pub fn find_center(mask: &SegmentationMask) -> Option<PixelCoordinate> {
    let mut total_weight = 0.0f64;
    let mut weighted_x = 0.0f64;
    let mut weighted_y = 0.0f64;

    for ((y, x), &value) in mask.get_pixels_view().indexed_iter() {
        if value != 0 {
            let weight = value as f64 / MASK_FOREGROUND as f64;
            total_weight += weight;
            weighted_x += x as f64 * weight;
            weighted_y += y as f64 * weight;
        }
    }

    if total_weight == 0.0 {
        return None;
    }

    Some(PixelCoordinate::new(
        (weighted_x / total_weight) as u32,
        (weighted_y / total_weight) as u32,
    ))
}
