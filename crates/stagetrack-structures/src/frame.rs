use image::imageops::{self, FilterType};
use image::GrayImage;
use ndarray::{s, Array2, ArrayView2, ArrayViewMut2, Axis};

use crate::{PanelSide, StageTrackError};

/// Mask value marking foreground pixels.
pub const MASK_FOREGROUND: u8 = 255;

// NOTE -> (0,0) is in the top left corner!

/// A single grayscale camera frame.
///
/// Stores 8-bit pixel data as a 2D array in (height, width) row-major order.
/// Frames are published whole and never mutated by consumers; the acquisition
/// stage applies its orientation correction before publishing.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelFrame {
    pixels: Array2<u8>,
}

impl PixelFrame {
    /// Creates a new zero-filled frame.
    pub fn new(height: u32, width: u32) -> PixelFrame {
        PixelFrame {
            pixels: Array2::<u8>::zeros((height as usize, width as usize)),
        }
    }

    /// Creates a frame from an existing 2D array in (height, width) order.
    pub fn from_array(pixels: Array2<u8>) -> PixelFrame {
        PixelFrame { pixels }
    }

    /// Creates a frame from a grayscale raster image.
    pub fn from_gray_image(img: &GrayImage) -> Result<PixelFrame, StageTrackError> {
        let (width, height) = img.dimensions();
        let pixels = Array2::from_shape_vec((height as usize, width as usize), img.as_raw().clone())
            .map_err(|e| {
                StageTrackError::InternalError(format!("Failed to shape raster data: {}", e))
            })?;
        Ok(PixelFrame { pixels })
    }

    pub fn get_height(&self) -> u32 {
        self.pixels.shape()[0] as u32 // nd array is row major, coords are yx
    }

    pub fn get_width(&self) -> u32 {
        self.pixels.shape()[1] as u32
    }

    /// Returns a read-only view of the pixel data.
    pub fn get_pixels_view(&self) -> ArrayView2<u8> {
        self.pixels.view()
    }

    /// Returns a mutable view of the pixel data.
    pub fn get_pixels_view_mut(&mut self) -> ArrayViewMut2<u8> {
        self.pixels.view_mut()
    }

    /// Returns a reference to the internal pixel data array.
    pub fn get_internal_data(&self) -> &Array2<u8> {
        &self.pixels
    }

    /// Returns a mutable reference to the internal pixel data array.
    ///
    /// Be cautious when using this as you can easily set the data to an invalid state!
    pub fn get_internal_data_mut(&mut self) -> &mut Array2<u8> {
        &mut self.pixels
    }

    /// Consumes the frame and returns the underlying pixel array.
    pub fn into_array(self) -> Array2<u8> {
        self.pixels
    }

    /// Flips the frame top-to-bottom in place.
    ///
    /// The camera's vertical axis runs opposite to the stage's; acquisition
    /// applies this once per captured frame.
    pub fn flip_vertical(&mut self) {
        self.pixels.invert_axis(Axis(0));
    }

    /// Cuts the centered `crop_size` square out of one lateral half of the frame.
    ///
    /// The frame is split into left/right panels at width/2; the crop window
    /// is centered within the selected panel. Returns an owned copy so the
    /// source frame stays untouched for display consumers.
    pub fn crop_panel(
        &self,
        side: PanelSide,
        crop_size: u32,
    ) -> Result<PixelFrame, StageTrackError> {
        let height = self.get_height() as usize;
        let panel_width = (self.get_width() / 2) as usize;
        let crop = crop_size as usize;

        if crop == 0 || crop > panel_width || crop > height {
            return Err(StageTrackError::BadParameters(format!(
                "Crop size {} does not fit a {}x{} panel!",
                crop, panel_width, height
            )));
        }

        let top = height / 2 - crop / 2;
        let panel_start = match side {
            PanelSide::Left => 0,
            PanelSide::Right => panel_width,
        };
        let left = panel_start + panel_width / 2 - crop / 2;

        let window = self
            .pixels
            .slice(s![top..top + crop, left..left + crop])
            .to_owned();
        Ok(PixelFrame { pixels: window })
    }

    /// Returns a bilinearly resampled copy of this frame.
    pub fn resized(&self, width: u32, height: u32) -> Result<PixelFrame, StageTrackError> {
        if width == self.get_width() && height == self.get_height() {
            return Ok(self.clone());
        }
        let img = self.export_as_gray_image()?;
        let resampled = imageops::resize(&img, width, height, FilterType::Triangle);
        PixelFrame::from_gray_image(&resampled)
    }

    /// Exports the frame as a `GrayImage` for raster interop.
    pub fn export_as_gray_image(&self) -> Result<GrayImage, StageTrackError> {
        let buffer: Vec<u8> = self.pixels.iter().copied().collect();
        GrayImage::from_raw(self.get_width(), self.get_height(), buffer).ok_or_else(|| {
            StageTrackError::InternalError("Failed to create grayscale image".to_string())
        })
    }
}

/// A binary segmentation result over the canonical region.
///
/// Pixels are either 0 or [`MASK_FOREGROUND`]. Derived from a cropped frame
/// each vision cycle and republished whole; transient by design.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentationMask {
    pixels: Array2<u8>,
}

impl SegmentationMask {
    /// Creates a mask from an existing 0/255 array in (height, width) order.
    pub fn from_array(pixels: Array2<u8>) -> SegmentationMask {
        SegmentationMask { pixels }
    }

    pub fn get_height(&self) -> u32 {
        self.pixels.shape()[0] as u32
    }

    pub fn get_width(&self) -> u32 {
        self.pixels.shape()[1] as u32
    }

    pub fn get_pixels_view(&self) -> ArrayView2<u8> {
        self.pixels.view()
    }

    pub fn get_internal_data(&self) -> &Array2<u8> {
        &self.pixels
    }

    /// True if at least one pixel is foreground.
    ///
    /// An all-zero mask means segmentation found no object; callers must
    /// treat that as a failure signal rather than an object at (0, 0).
    pub fn has_foreground(&self) -> bool {
        self.pixels.iter().any(|&v| v != 0)
    }

    /// Returns the bitwise complement of this mask (255 - value).
    pub fn inverted(&self) -> SegmentationMask {
        SegmentationMask {
            pixels: self.pixels.mapv(|v| MASK_FOREGROUND - v),
        }
    }

    /// Exports the mask as a `GrayImage` for display or annotation.
    pub fn export_as_gray_image(&self) -> Result<GrayImage, StageTrackError> {
        let buffer: Vec<u8> = self.pixels.iter().copied().collect();
        GrayImage::from_raw(self.get_width(), self.get_height(), buffer).ok_or_else(|| {
            StageTrackError::InternalError("Failed to create mask image".to_string())
        })
    }
}
