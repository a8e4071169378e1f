//! End-to-end tests of the segmentation engine and coordinate mapper on
//! synthetic frames: bright-on-dark and dark-on-bright objects, empty
//! regions, and the pixel-to-stage mapping chain.

use ndarray::Array2;
use stagetrack_structures::{PixelCoordinate, PixelFrame, StageCoordinate, MASK_FOREGROUND};
use stagetrack_vision::segmentation::threshold_at_quantile;
use stagetrack_vision::{
    binary_thresholding, find_center, inverted_binary_thresholding, segment_and_locate,
    PixelToStageMapper, VisionFailure, CANONICAL_REGION_SIZE,
};

//region Helper Functions

const REGION: usize = CANONICAL_REGION_SIZE as usize;

/// Dim pixels placed in symmetric pairs about the block center (300.5, 200.5)
/// so they pull the tail of the intensity histogram without moving the
/// center of mass.
const SYMMETRIC_STRAYS: [(usize, usize); 8] = [
    (280, 180),
    (321, 221),
    (285, 220),
    (316, 181),
    (270, 200),
    (331, 201),
    (290, 210),
    (311, 191),
];

/// A dark 512x512 frame holding a bright 10x10 block centered at pixel
/// (300, 200) plus the symmetric dim strays.
fn bright_block_frame() -> PixelFrame {
    let mut pixels = Array2::<u8>::zeros((REGION, REGION));
    for y in 196..=205 {
        for x in 296..=305 {
            pixels[(y, x)] = 255;
        }
    }
    for &(x, y) in &SYMMETRIC_STRAYS {
        pixels[(y, x)] = 40;
    }
    PixelFrame::from_array(pixels)
}

/// The same scene with polarity flipped: bright field, dark block.
fn dark_block_frame() -> PixelFrame {
    let mut pixels = Array2::<u8>::from_elem((REGION, REGION), 255);
    for y in 196..=205 {
        for x in 296..=305 {
            pixels[(y, x)] = 0;
        }
    }
    for &(x, y) in &SYMMETRIC_STRAYS {
        pixels[(y, x)] = 40;
    }
    PixelFrame::from_array(pixels)
}

/// Deterministic mid-gray texture so thresholds land strictly inside the
/// intensity range.
fn textured_frame() -> PixelFrame {
    let pixels =
        Array2::from_shape_fn((REGION, REGION), |(y, x)| ((x * 7 + y * 13) % 191) as u8);
    PixelFrame::from_array(pixels)
}

//endregion

#[test]
fn bright_block_is_isolated_and_centered() {
    let frame = bright_block_frame();
    let mask = binary_thresholding(&frame).unwrap();

    // The block plus the eight strays survive the 99.96th percentile.
    let foreground = mask.get_internal_data().iter().filter(|&&v| v != 0).count();
    assert_eq!(foreground, 108);

    let center = find_center(&mask).unwrap();
    assert_eq!(center, PixelCoordinate::new(300, 200));
}

#[test]
fn bright_block_maps_to_expected_stage_target() {
    let frame = bright_block_frame();
    let located = segment_and_locate(&frame, false).unwrap();

    let mapper = PixelToStageMapper::new_uniform(0.15);
    let target = mapper.map(
        located.centroid,
        CANONICAL_REGION_SIZE,
        CANONICAL_REGION_SIZE,
        StageCoordinate::new(0.0, 0.0),
    );

    // (300 - 256) * 0.15 = 6.6, (200 - 256) * 0.15 = -8.4, within rounding.
    assert!((target.x - 6.6).abs() < 0.2, "target.x = {}", target.x);
    assert!((target.y + 8.4).abs() < 0.2, "target.y = {}", target.y);
}

#[test]
fn dark_block_is_found_by_inverted_thresholding() {
    let frame = dark_block_frame();
    let mask = inverted_binary_thresholding(&frame).unwrap();

    let foreground = mask.get_internal_data().iter().filter(|&&v| v != 0).count();
    assert_eq!(foreground, 108);

    let center = find_center(&mask).unwrap();
    assert_eq!(center, PixelCoordinate::new(300, 200));
}

#[test]
fn all_zero_region_yields_no_centroid() {
    let frame = PixelFrame::from_array(Array2::zeros((REGION, REGION)));
    let mask = binary_thresholding(&frame).unwrap();
    assert!(!mask.has_foreground());
    assert_eq!(find_center(&mask), None);

    // The full path must surface the failure, never an "object at (0, 0)".
    match segment_and_locate(&frame, false) {
        Err(VisionFailure::EmptyMask) => {}
        other => panic!("Expected EmptyMask failure, got {:?}", other.map(|l| l.centroid)),
    }
}

#[test]
fn uniform_bright_region_yields_no_centroid_when_inverted() {
    let frame = PixelFrame::from_array(Array2::from_elem((REGION, REGION), 255));
    let mask = inverted_binary_thresholding(&frame).unwrap();
    assert!(!mask.has_foreground());
}

#[test]
fn standard_and_inverted_masks_are_complementary_at_same_quantile() {
    let frame = textured_frame();
    let standard = threshold_at_quantile(&frame, 0.5).unwrap();
    let inverted = threshold_at_quantile(&frame, 0.5).unwrap().inverted();

    for (&a, &b) in standard
        .get_internal_data()
        .iter()
        .zip(inverted.get_internal_data().iter())
    {
        assert_eq!(a, MASK_FOREGROUND - b);
    }

    // Round trip: inverting twice restores the original mask.
    assert_eq!(inverted.inverted(), standard);
}

#[test]
fn undersized_region_is_resampled_to_canonical_size() {
    // A 256x256 crop with a bright block; segmentation still runs at 512.
    let mut pixels = Array2::<u8>::zeros((256, 256));
    for y in 96..=105 {
        for x in 146..=155 {
            pixels[(y, x)] = 255;
        }
    }
    for &(x, y) in &[(130usize, 90usize), (171, 111), (140, 110), (161, 91)] {
        pixels[(y, x)] = 40;
    }
    let frame = PixelFrame::from_array(pixels);

    let mask = binary_thresholding(&frame).unwrap();
    assert_eq!(mask.get_width(), CANONICAL_REGION_SIZE);
    assert_eq!(mask.get_height(), CANONICAL_REGION_SIZE);

    // The block scales 2x: its center lands near (302, 202) in canonical space.
    let center = find_center(&mask).unwrap();
    assert!((295..=310).contains(&center.x), "center.x = {}", center.x);
    assert!((195..=210).contains(&center.y), "center.y = {}", center.y);
}

#[test]
fn annotated_view_marks_the_centroid() {
    let frame = bright_block_frame();
    let located = segment_and_locate(&frame, false).unwrap();

    let ring_pixel = (
        located.centroid.y as usize,
        located.centroid.x as usize + 10,
    );
    assert_eq!(
        located.annotated.get_internal_data()[ring_pixel],
        MASK_FOREGROUND
    );
}
