use stagetrack_structures::{PixelCoordinate, StageCoordinate};

/// Converts pixel-space centroids into absolute stage-space targets.
///
/// The mapper translates the centroid's offset from the image center into a
/// stage-space offset and adds it to the current stage position:
///
/// ```text
/// target_x = (pixel_x - width / 2) * scale_x + stage_x
/// target_y = (pixel_y - height / 2) * scale_y + stage_y
/// ```
///
/// The scales are calibration constants (stage units per canonical pixel,
/// fixed by the optical magnification) supplied through configuration. The
/// mapper carries no history; it is a pure affine transform per call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelToStageMapper {
    scale_x: f64,
    scale_y: f64,
}

impl PixelToStageMapper {
    pub fn new(scale_x: f64, scale_y: f64) -> PixelToStageMapper {
        PixelToStageMapper { scale_x, scale_y }
    }

    /// Both axes share one calibration scale (square pixels).
    pub fn new_uniform(scale: f64) -> PixelToStageMapper {
        PixelToStageMapper::new(scale, scale)
    }

    /// Maps a centroid within a `region_width` x `region_height` region to a
    /// stage target, given the stage's current position.
    pub fn map(
        &self,
        centroid: PixelCoordinate,
        region_width: u32,
        region_height: u32,
        current: StageCoordinate,
    ) -> StageCoordinate {
        let offset_x = centroid.x as f64 - region_width as f64 / 2.0;
        let offset_y = centroid.y as f64 - region_height as f64 / 2.0;
        StageCoordinate::new(
            offset_x * self.scale_x + current.x,
            offset_y * self.scale_y + current.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_pixel_maps_to_current_position() {
        let mapper = PixelToStageMapper::new_uniform(0.15);
        let stage = StageCoordinate::new(42.5, -7.25);
        let mapped = mapper.map(PixelCoordinate::new(256, 256), 512, 512, stage);
        assert_eq!(mapped, stage);
    }

    #[test]
    fn mapping_is_affine_in_pixel_coordinates() {
        let mapper = PixelToStageMapper::new_uniform(0.15);
        let stage = StageCoordinate::new(10.0, 20.0);

        let a = mapper.map(PixelCoordinate::new(100, 50), 512, 512, stage);
        let b = mapper.map(PixelCoordinate::new(101, 50), 512, 512, stage);
        let c = mapper.map(PixelCoordinate::new(100, 51), 512, 512, stage);

        // One pixel of offset moves the target by exactly one scale step.
        assert!((b.x - a.x - 0.15).abs() < 1e-12);
        assert!((b.y - a.y).abs() < 1e-12);
        assert!((c.y - a.y - 0.15).abs() < 1e-12);
        assert!((c.x - a.x).abs() < 1e-12);
    }

    #[test]
    fn anisotropic_scales_apply_per_axis() {
        let mapper = PixelToStageMapper::new(0.1, 0.2);
        let mapped = mapper.map(
            PixelCoordinate::new(266, 266),
            512,
            512,
            StageCoordinate::new(0.0, 0.0),
        );
        assert!((mapped.x - 1.0).abs() < 1e-12);
        assert!((mapped.y - 2.0).abs() < 1e-12);
    }
}
