// ============================================================================
// IMAGE I/O — decode and encode boundary around the `image` crate
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ImageError};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::buffer::PixelBuffer;

/// Raster output formats supported by the export path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
}

impl SaveFormat {
    /// Parse an explicit format name (`--format png`).
    pub fn from_name(name: &str) -> Option<SaveFormat> {
        match name.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "jpeg" | "jpg" => Some(SaveFormat::Jpeg),
            "bmp" => Some(SaveFormat::Bmp),
            _ => None,
        }
    }

    /// Infer a format from an output path's extension.
    pub fn from_extension(path: &Path) -> Option<SaveFormat> {
        let ext = path.extension()?.to_str()?;
        SaveFormat::from_name(ext)
    }

    /// Canonical file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
        }
    }
}

/// Error loading an image into a [`PixelBuffer`].
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Decode(ImageError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "I/O error: {}", e),
            LoadError::Decode(e) => write!(f, "decode error: {}", e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<ImageError> for LoadError {
    fn from(e: ImageError) -> Self {
        LoadError::Decode(e)
    }
}

/// Decode in-memory image bytes (any format the `image` crate recognizes)
/// into an RGBA8 buffer.
pub fn decode_bytes(bytes: &[u8]) -> Result<PixelBuffer, LoadError> {
    let img = image::load_from_memory(bytes)?.to_rgba8();
    Ok(PixelBuffer::from_rgba_image(&img))
}

/// Read and decode an image file.
pub fn load_buffer(path: &Path) -> Result<PixelBuffer, LoadError> {
    let bytes = std::fs::read(path)?;
    decode_bytes(&bytes)
}

/// Encode a buffer and write it to `path`.
///
/// JPEG has no alpha channel, so the buffer is flattened to RGB first;
/// `quality` (1–100) only applies to JPEG.
pub fn encode_and_write(
    buf: &PixelBuffer,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ImageError> {
    let image = buf.to_rgba_image();
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    match format {
        SaveFormat::Png => {
            let encoder = PngEncoder::new(&mut writer);
            #[allow(deprecated)]
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
        SaveFormat::Jpeg => {
            let rgb_image = DynamicImage::ImageRgba8(image).to_rgb8();
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            encoder.encode(
                rgb_image.as_raw(),
                rgb_image.width(),
                rgb_image.height(),
                image::ColorType::Rgb8,
            )?;
        }
        SaveFormat::Bmp => {
            let mut encoder = BmpEncoder::new(&mut writer);
            encoder.encode(
                image.as_raw(),
                image.width(),
                image.height(),
                image::ColorType::Rgba8,
            )?;
        }
    }

    Ok(())
}

/// Encode a buffer as PNG in memory — the export contract for callers that
/// want bytes rather than a file.
pub fn encode_png(buf: &PixelBuffer) -> Result<Vec<u8>, ImageError> {
    let image = buf.to_rgba_image();
    let mut out = Vec::new();
    let encoder = PngEncoder::new(&mut out);
    #[allow(deprecated)]
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ColorType::Rgba8,
    )?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!(SaveFormat::from_name("PNG"), Some(SaveFormat::Png));
        assert_eq!(SaveFormat::from_name("jpg"), Some(SaveFormat::Jpeg));
        assert_eq!(SaveFormat::from_name("tiff"), None);
        assert_eq!(
            SaveFormat::from_extension(Path::new("out/result.JPEG")),
            Some(SaveFormat::Jpeg)
        );
        assert_eq!(SaveFormat::from_extension(Path::new("noext")), None);
        assert_eq!(SaveFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let mut raw = Vec::new();
        for i in 0..(4 * 3) as u32 {
            raw.extend_from_slice(&[(i * 11) as u8, (i * 23) as u8, (i * 5) as u8, 255]);
        }
        let buf = PixelBuffer::from_raw(4, 3, raw).unwrap();
        let bytes = encode_png(&buf).unwrap();
        let back = decode_bytes(&bytes).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(matches!(
            decode_bytes(&[0, 1, 2, 3, 4]),
            Err(LoadError::Decode(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_buffer(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
