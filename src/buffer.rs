// ============================================================================
// PIXEL BUFFER — owned, tightly packed RGBA8 raster
// ============================================================================

use image::RgbaImage;

/// Bytes per pixel: R, G, B, A.
pub const BYTES_PER_PIXEL: usize = 4;

/// An in-memory RGBA8 raster: row-major, 4 bytes per pixel, no padding.
///
/// The byte index of pixel (x, y), channel c is `(y * width + x) * 4 + c`.
/// Invariant: `pixels.len() == width * height * 4`, upheld by every
/// constructor. Operations in [`crate::ops`] never mutate their input; each
/// produces a freshly allocated `PixelBuffer`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl PixelBuffer {
    /// Create a buffer filled with a single color.
    pub fn new_filled(width: u32, height: u32, color: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        PixelBuffer {
            width,
            height,
            pixels,
        }
    }

    /// Wrap raw RGBA bytes. Returns `None` if the byte count does not match
    /// the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * BYTES_PER_PIXEL {
            return None;
        }
        Some(PixelBuffer {
            width,
            height,
            pixels,
        })
    }

    /// Copy the pixel data out of a decoded [`RgbaImage`].
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        PixelBuffer {
            width: img.width(),
            height: img.height(),
            pixels: img.as_raw().clone(),
        }
    }

    /// Convert into an [`RgbaImage`] for the encoder boundary.
    pub fn to_rgba_image(&self) -> RgbaImage {
        // Length matches by invariant, so from_raw cannot fail.
        RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).unwrap()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes in one row: `width * 4`.
    pub fn row_stride(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    /// Sample one pixel (the eyedropper primitive). `None` when (x, y) is
    /// outside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_validates_length() {
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 16]).is_some());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 15]).is_none());
        assert!(PixelBuffer::from_raw(2, 2, vec![0; 17]).is_none());
    }

    #[test]
    fn new_filled_layout() {
        let buf = PixelBuffer::new_filled(3, 2, [10, 20, 30, 40]);
        assert_eq!(buf.as_bytes().len(), 3 * 2 * 4);
        assert_eq!(buf.row_stride(), 12);
        // Pixel (2, 1) sits at byte (1*3 + 2)*4 = 20.
        assert_eq!(&buf.as_bytes()[20..24], &[10, 20, 30, 40]);
    }

    #[test]
    fn pixel_sampling_in_and_out_of_bounds() {
        let mut raw = vec![0u8; 2 * 2 * 4];
        raw[(1 * 2 + 1) * 4..(1 * 2 + 1) * 4 + 4].copy_from_slice(&[1, 2, 3, 4]);
        let buf = PixelBuffer::from_raw(2, 2, raw).unwrap();
        assert_eq!(buf.pixel(1, 1), Some([1, 2, 3, 4]));
        assert_eq!(buf.pixel(0, 0), Some([0, 0, 0, 0]));
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.pixel(0, 2), None);
    }

    #[test]
    fn rgba_image_round_trip() {
        let buf = PixelBuffer::new_filled(4, 3, [200, 100, 50, 255]);
        let img = buf.to_rgba_image();
        assert_eq!(img.dimensions(), (4, 3));
        let back = PixelBuffer::from_rgba_image(&img);
        assert_eq!(back, buf);
    }
}
