use crate::error::{Result, SegmentationError};
use image::{DynamicImage, GrayImage, Luma, RgbImage};

/// Intensity written for foreground pixels in a binary mask.
pub const FOREGROUND: u8 = 255;
/// Intensity written for background pixels in a binary mask.
pub const BACKGROUND: u8 = 0;

/// Immutable single-channel 8-bit raster.
///
/// Construction rejects zero-pixel images, so every `Raster` in circulation
/// has at least one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    image: GrayImage,
}

impl Raster {
    pub fn new(image: GrayImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SegmentationError::InvalidInput(format!(
                "raster has no pixels ({}x{})",
                width, height
            )));
        }
        Ok(Self { image })
    }

    /// Build a raster from a row-major buffer of `width * height` samples.
    pub fn from_raw(width: u32, height: u32, samples: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if samples.len() != expected {
            return Err(SegmentationError::InvalidInput(format!(
                "expected {} samples for {}x{}, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        let image = GrayImage::from_raw(width, height, samples).ok_or_else(|| {
            SegmentationError::InvalidInput(format!("cannot shape buffer as {}x{}", width, height))
        })?;
        Self::new(image)
    }

    /// Convert an RGB image with the fixed luma weights (0.299, 0.587, 0.114),
    /// evaluated in 14-bit fixed point with round-half-up.
    pub fn from_rgb(rgb: &RgbImage) -> Result<Self> {
        let (width, height) = rgb.dimensions();
        let gray = GrayImage::from_fn(width, height, |x, y| {
            let pixel = rgb.get_pixel(x, y);
            Luma([luma(pixel[0], pixel[1], pixel[2])])
        });
        Self::new(gray)
    }

    /// Convert any decoded image. Alpha is discarded.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        match image {
            DynamicImage::ImageLuma8(gray) => Self::new(gray.clone()),
            other => Self::from_rgb(&other.to_rgb8()),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel_count(&self) -> usize {
        self.image.as_raw().len()
    }

    /// Row-major samples.
    pub fn samples(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Two-level mask: `FOREGROUND` where intensity > `threshold`, else `BACKGROUND`.
    pub fn binarize(&self, threshold: u8) -> GrayImage {
        let mut mask = self.image.clone();
        for sample in mask.iter_mut() {
            *sample = if *sample > threshold {
                FOREGROUND
            } else {
                BACKGROUND
            };
        }
        mask
    }
}

const LUMA_SHIFT: u32 = 14;
// 0.299, 0.587, 0.114 scaled by 2^14; the weights sum to exactly 2^14.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = LUMA_R * r as u32 + LUMA_G * g as u32 + LUMA_B * b as u32;
    ((weighted + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn rejects_empty_image() {
        let err = Raster::new(GrayImage::new(0, 4)).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidInput(_)));
    }

    #[test]
    fn rejects_mismatched_buffer() {
        let err = Raster::from_raw(3, 3, vec![0; 8]).unwrap_err();
        assert!(matches!(err, SegmentationError::InvalidInput(_)));
    }

    #[test]
    fn luma_conversion_uses_fixed_weights() {
        let rgb = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let raster = Raster::from_rgb(&rgb).unwrap();
        assert_eq!(raster.samples(), &[76, 150, 29]);
    }

    #[test]
    fn luma_rounds_in_fixed_point() {
        // f32 rounding gives 26 for the first triple.
        assert_eq!(luma(0, 3, 217), 27);
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 0), 226);
    }

    #[test]
    fn gray_pixels_survive_conversion() {
        let rgb = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        let raster = Raster::from_rgb(&rgb).unwrap();
        assert!(raster.samples().iter().all(|&v| v == 100));
    }

    #[test]
    fn binarize_is_strictly_greater_than() {
        let raster = Raster::from_raw(4, 1, vec![9, 10, 11, 255]).unwrap();
        let mask = raster.binarize(10);
        assert_eq!(mask.as_raw(), &[0, 0, 255, 255]);

        let all_background = raster.binarize(255);
        assert!(all_background.iter().all(|&v| v == BACKGROUND));
    }
}
