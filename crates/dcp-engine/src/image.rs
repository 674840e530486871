//! Interleaved 8-bit RGB image buffer.

use crate::error::DcpResult;
use crate::frame::try_alloc;

/// Number of interleaved channels per pixel.
pub const CHANNELS: usize = 3;

/// A 3-channel 8-bit image stored row-major as `R, G, B, R, G, B, ...`.
///
/// Input images are borrowed read-only by the engine; output images are
/// either allocated by [`DcpEngine::process`](crate::DcpEngine::process) or
/// supplied by the caller to
/// [`DcpEngine::process_into`](crate::DcpEngine::process_into).
///
/// # Example
///
/// ```
/// use dcp_engine::RgbImage;
///
/// let mut image = RgbImage::from_pixel(4, 3, [128, 128, 128]);
/// image.put_pixel(1, 2, [255, 0, 0]);
/// assert_eq!(image.pixel(1, 2), [255, 0, 0]);
/// assert_eq!(image.as_raw().len(), 4 * 3 * 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbImage {
    /// Create a black image.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_pixel(width, height, [0, 0, 0])
    }

    /// Create a black image, reporting allocation failure instead of aborting.
    pub fn try_new(width: u32, height: u32) -> DcpResult<Self> {
        let len = width as usize * height as usize * CHANNELS;
        let data = try_alloc(len, 0u8, "output image")?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Create an image filled with one color.
    pub fn from_pixel(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let pixels = width as usize * height as usize;
        let data = rgb.iter().copied().cycle().take(pixels * CHANNELS).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Create an image by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 3]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * CHANNELS);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw interleaved RGB bytes.
    ///
    /// Returns `None` if `data.len() != width * height * 3`.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize * CHANNELS {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Color of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = self.offset(x, y);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Overwrite the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the image.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        let i = self.offset(x, y);
        self.data[i..i + CHANNELS].copy_from_slice(&rgb);
    }

    #[inline]
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    #[inline]
    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} image",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_checks_length() {
        assert!(RgbImage::from_raw(2, 2, vec![0; 12]).is_some());
        assert!(RgbImage::from_raw(2, 2, vec![0; 11]).is_none());
        assert!(RgbImage::from_raw(2, 2, vec![0; 16]).is_none());
    }

    #[test]
    fn test_from_pixel_fills_every_pixel() {
        let image = RgbImage::from_pixel(3, 2, [10, 20, 30]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(image.pixel(x, y), [10, 20, 30]);
            }
        }
    }

    #[test]
    fn test_from_fn_is_row_major() {
        let image = RgbImage::from_fn(3, 2, |x, y| [x as u8, y as u8, 0]);
        assert_eq!(&image.as_raw()[..6], &[0, 0, 0, 1, 0, 0]);
        assert_eq!(image.pixel(2, 1), [2, 1, 0]);
    }

    #[test]
    fn test_try_new_is_black() {
        let image = RgbImage::try_new(5, 4).unwrap();
        assert_eq!(image.dimensions(), (5, 4));
        assert!(image.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    #[should_panic(expected = "outside 2x2 image")]
    fn test_pixel_out_of_bounds_panics() {
        let image = RgbImage::new(2, 2);
        let _ = image.pixel(2, 0);
    }
}
