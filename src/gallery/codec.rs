//! Photo compression: decode, shrink to a bounding size, re-encode as JPEG

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

use crate::core::types::Result;

/// Mime type of every stored photo.
pub const ENCODED_MIME: &str = "image/jpeg";

/// Dimensions after fitting `width x height` inside a `max x max` box.
///
/// Scale is `min(max/width, max/height, 1)`, so images are only ever shrunk,
/// and the result is rounded to whole pixels (never below 1).
pub fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let ratio = (max as f64 / width as f64)
        .min(max as f64 / height as f64)
        .min(1.0);
    let w = ((width as f64 * ratio).round() as u32).max(1);
    let h = ((height as f64 * ratio).round() as u32).max(1);
    (w, h)
}

/// A re-encoded photo.
#[derive(Clone, Debug)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes`, shrink to fit `max_dimension`, and encode as JPEG at
/// `quality`.
pub fn compress_image(bytes: &[u8], max_dimension: u32, quality: u8) -> Result<EncodedImage> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = fit_within(img.width(), img.height(), max_dimension);
    let img = if (width, height) != (img.width(), img.height()) {
        img.resize_exact(width, height, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();
    let mut out = Cursor::new(Vec::new());
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100));
        encoder.encode_image(&rgb)?;
    }

    Ok(EncodedImage {
        bytes: out.into_inner(),
        width,
        height,
    })
}
