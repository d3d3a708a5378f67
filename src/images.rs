//! Photo Compression
//!
//! Photos are compressed client-side before upload, exactly like the
//! original canvas-based pipeline: decode, downscale to a maximum edge
//! length, re-encode as JPEG. Blob sizes matter here because every photo
//! rides the commit API as a base64 payload.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ExtendedColorType, GenericImageView, ImageEncoder};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

use crate::config::ImageConfig;

/// Errors from photo preparation
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not decode image: {0}")]
    Decode(String),

    #[error("Could not encode JPEG: {0}")]
    Encode(String),
}

/// Decode a photo, downscale it to the configured maximum edge length
/// (aspect-preserving), and re-encode it as JPEG.
pub fn prepare_photo(data: &[u8], config: &ImageConfig) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;

    let (w, h) = img.dimensions();
    let img = if w > config.max_dimension || h > config.max_dimension {
        img.resize(config.max_dimension, config.max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut out), config.jpeg_quality)
        .write_image(rgb.as_raw(), w, h, ExtendedColorType::Rgb8)
        .map_err(|e| ImageError::Encode(e.to_string()))?;

    tracing::debug!(
        "Prepared photo: {}x{}, {} -> {} bytes",
        w,
        h,
        data.len(),
        out.len()
    );
    Ok(out)
}

/// Read a photo from disk and prepare it for upload
pub fn load_and_prepare(path: &Path, config: &ImageConfig) -> Result<Vec<u8>, ImageError> {
    let data = std::fs::read(path)?;
    prepare_photo(&data, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
            .unwrap();
        out
    }

    #[test]
    fn test_large_photo_downscaled() {
        let config = ImageConfig {
            max_dimension: 64,
            jpeg_quality: 80,
        };
        let jpeg = prepare_photo(&png_bytes(200, 100), &config).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w <= 64 && h <= 64);
        // Aspect ratio survives the resize
        assert_eq!((w, h), (64, 32));
    }

    #[test]
    fn test_small_photo_kept_at_size() {
        let config = ImageConfig {
            max_dimension: 1600,
            jpeg_quality: 80,
        };
        let jpeg = prepare_photo(&png_bytes(40, 30), &config).unwrap();

        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30));
    }

    #[test]
    fn test_output_is_jpeg() {
        let config = ImageConfig::default();
        let jpeg = prepare_photo(&png_bytes(10, 10), &config).unwrap();
        // JPEG SOI marker
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_garbage_input_rejected() {
        let config = ImageConfig::default();
        let err = prepare_photo(b"not an image", &config).unwrap_err();
        assert!(matches!(err, ImageError::Decode(_)));
    }
}
