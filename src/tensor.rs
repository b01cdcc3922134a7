//! Host image tensor: `height × width × channels` floats in `[0, 1]`.

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

use crate::error::BananaError;

/// A single image in the host's tensor layout.
///
/// Pixels are stored row-major with interleaved channels (HWC). Values are
/// expected in `[0, 1]`; anything outside is clamped when the image is
/// encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct HostImage {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<f32>,
}

impl HostImage {
    /// Build an image from raw HWC data.
    ///
    /// # Errors
    ///
    /// Returns an error if `channels` is not 1, 3 or 4, or if `data` does not
    /// hold exactly `width * height * channels` values.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<f32>) -> Result<Self, BananaError> {
        if !matches!(channels, 1 | 3 | 4) {
            return Err(BananaError::ImageConversion(format!(
                "Unsupported channel count {channels}; expected 1, 3 or 4"
            )));
        }
        let expected = width as usize * height as usize * usize::from(channels);
        if data.len() != expected {
            return Err(BananaError::ImageConversion(format!(
                "Tensor has {} values but {width}x{height}x{channels} needs {expected}",
                data.len()
            )));
        }
        Ok(Self { width, height, channels, data })
    }

    /// Convert a decoded image into an RGB tensor.
    #[must_use]
    pub fn from_dynamic(img: &DynamicImage) -> Self {
        let rgb = img.to_rgb32f();
        let (width, height) = rgb.dimensions();
        Self { width, height, channels: 3, data: rgb.into_raw() }
    }

    /// Convert to an 8-bit image suitable for encoding.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer cannot be assembled, which only
    /// happens if the invariants checked in [`HostImage::new`] are broken.
    pub fn to_dynamic(&self) -> Result<DynamicImage, BananaError> {
        let bytes: Vec<u8> = self.data.iter().map(|&v| to_u8(v)).collect();
        let img = match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageLuma8),
            3 => RgbImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageRgb8),
            _ => RgbaImage::from_raw(self.width, self.height, bytes).map(DynamicImage::ImageRgba8),
        };
        img.ok_or_else(|| {
            BananaError::ImageConversion(format!(
                "Buffer does not match {}x{}x{}",
                self.width, self.height, self.channels
            ))
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channels per pixel.
    #[must_use]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// The raw HWC values.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// The channel values of the pixel at `(x, y)`.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[f32]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = usize::from(self.channels);
        let start = (y as usize * self.width as usize + x as usize) * c;
        self.data.get(start..start + c)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_wrong_length() {
        assert!(HostImage::new(2, 2, 3, vec![0.0; 11]).is_err());
    }

    #[test]
    fn new_rejects_bad_channels() {
        assert!(HostImage::new(1, 1, 2, vec![0.0; 2]).is_err());
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let data = vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.5, 0.5, 0.5, 0.25, 0.25, 0.25];
        let img = HostImage::new(2, 2, 3, data).unwrap();
        assert_eq!(img.pixel(1, 0), Some(&[1.0, 1.0, 1.0][..]));
        assert_eq!(img.pixel(0, 1), Some(&[0.5, 0.5, 0.5][..]));
        assert_eq!(img.pixel(2, 0), None);
    }

    #[test]
    fn dynamic_conversion_preserves_dimensions_and_range() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, image::Rgb([255, 0, 128]));
        let img = HostImage::from_dynamic(&DynamicImage::ImageRgb8(rgb));

        assert_eq!((img.width(), img.height(), img.channels()), (3, 2, 3));
        let px = img.pixel(2, 1).unwrap();
        assert!((px[0] - 1.0).abs() < 1e-6);
        assert!(px[1].abs() < 1e-6);
        assert!((px[2] - 128.0 / 255.0).abs() < 1e-6);

        let back = img.to_dynamic().unwrap().to_rgb8();
        assert_eq!(back.get_pixel(2, 1), &image::Rgb([255, 0, 128]));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let img = HostImage::new(1, 1, 1, vec![1.7]).unwrap();
        let gray = img.to_dynamic().unwrap().to_luma8();
        assert_eq!(gray.get_pixel(0, 0).0, [255]);

        let img = HostImage::new(1, 1, 1, vec![-0.3]).unwrap();
        let gray = img.to_dynamic().unwrap().to_luma8();
        assert_eq!(gray.get_pixel(0, 0).0, [0]);
    }

    #[test]
    fn rgba_is_kept_on_encode_side() {
        let img = HostImage::new(1, 1, 4, vec![1.0, 0.0, 0.0, 0.5]).unwrap();
        let dynamic = img.to_dynamic().unwrap();
        assert!(dynamic.color().has_alpha());
    }
}
