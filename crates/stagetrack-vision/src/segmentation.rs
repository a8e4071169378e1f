use ndarray::{Array2, Zip};

use stagetrack_structures::{PixelFrame, SegmentationMask, StageTrackError, MASK_FOREGROUND};

/// Side length of the canonical square region all segmentation runs on.
///
/// Cropped regions are resampled to this size before thresholding so that
/// percentile statistics and centroid coordinates are comparable regardless
/// of the configured crop geometry.
pub const CANONICAL_REGION_SIZE: u32 = 512;

/// Quantile used to isolate a bright object against a dark background.
pub const BRIGHT_OBJECT_QUANTILE: f64 = 0.9996;

/// Quantile used to isolate a dark object against a bright background.
pub const DARK_OBJECT_QUANTILE: f64 = 1.0 - 0.98;

/// Computes the pixel intensity at `quantile` with linear interpolation
/// between the two nearest order statistics.
pub fn quantile_value(pixels: &Array2<u8>, quantile: f64) -> Result<f64, StageTrackError> {
    if !(0.0..=1.0).contains(&quantile) {
        return Err(StageTrackError::BadParameters(format!(
            "Quantile {} is outside [0, 1]!",
            quantile
        )));
    }
    if pixels.is_empty() {
        return Err(StageTrackError::BadParameters(
            "Cannot take a quantile of an empty region!".into(),
        ));
    }

    let mut values: Vec<u8> = pixels.iter().copied().collect();
    values.sort_unstable();

    let rank = quantile * (values.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;
    let fraction = rank - low as f64;
    Ok(values[low] as f64 + (values[high] as f64 - values[low] as f64) * fraction)
}

/// Resamples `region` to the canonical size and thresholds it at `quantile`:
/// pixels at or above the quantile intensity become foreground, the rest
/// background.
pub fn threshold_at_quantile(
    region: &PixelFrame,
    quantile: f64,
) -> Result<SegmentationMask, StageTrackError> {
    let canonical = region.resized(CANONICAL_REGION_SIZE, CANONICAL_REGION_SIZE)?;
    let threshold = quantile_value(canonical.get_internal_data(), quantile)?;

    let mut pixels = canonical.into_array();
    Zip::from(&mut pixels).par_for_each(|px| {
        *px = if (*px as f64) >= threshold {
            MASK_FOREGROUND
        } else {
            0
        };
    });
    Ok(SegmentationMask::from_array(pixels))
}

/// Standard segmentation: a bright object against a dark background.
///
/// Thresholds the canonical region at the 99.96th percentile so only the
/// brightest ~0.04% of pixels survive as foreground.
///
/// A region with no intensity spread (e.g. all zeros) yields a threshold the
/// entire region clears; the resulting saturated mask separates nothing, so
/// it is reported as empty instead of "one object covering the whole view".
pub fn binary_thresholding(region: &PixelFrame) -> Result<SegmentationMask, StageTrackError> {
    let mask = threshold_at_quantile(region, BRIGHT_OBJECT_QUANTILE)?;
    if mask.get_internal_data().iter().all(|&v| v == MASK_FOREGROUND) {
        let size = CANONICAL_REGION_SIZE as usize;
        return Ok(SegmentationMask::from_array(Array2::zeros((size, size))));
    }
    Ok(mask)
}

/// Inverted segmentation: a dark object against a bright background.
///
/// Thresholds at the 2nd percentile and inverts the result, so the dark
/// object carries the foreground value in the returned mask.
pub fn inverted_binary_thresholding(
    region: &PixelFrame,
) -> Result<SegmentationMask, StageTrackError> {
    Ok(threshold_at_quantile(region, DARK_OBJECT_QUANTILE)?.inverted())
}

/// The fixed diagnostic image shown when the vision path faults.
///
/// A full-size diagonal cross on a dark field, generated rather than loaded
/// so the error path has no file dependency.
pub fn error_diagnostic_image() -> PixelFrame {
    let size = CANONICAL_REGION_SIZE as usize;
    let mut pixels = Array2::<u8>::zeros((size, size));
    for i in 0..size {
        for offset in 0..4usize {
            let j = (i + offset).min(size - 1);
            pixels[(i, j)] = MASK_FOREGROUND;
            pixels[(i, size - 1 - j)] = MASK_FOREGROUND;
        }
    }
    PixelFrame::from_array(pixels)
}
