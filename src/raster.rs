//! Size-bounded image encoding for inline image parts.
//!
//! Images embedded in a user turn are shrunk so their longest edge fits a caller-chosen
//! bound and re-encoded as JPEG, which keeps request bodies small. Smaller images are
//! re-encoded at their original size, never upscaled.

use ::image::imageops::FilterType;
use ::image::{DynamicImage, GenericImageView, ImageFormat};
use base64::prelude::{Engine as _, BASE64_STANDARD};
use std::io::Cursor;
use std::path::Path;
use thiserror::Error;

/// Why an image could not be turned into an inline payload.
#[derive(Debug, Error)]
pub enum RasterizeError {
    /// The file could not be opened or decoded.
    #[error("Could not decode {path}: {source}")]
    Decode {
        /// Image that failed.
        path: String,
        /// Decoder error.
        source: ::image::ImageError,
    },

    /// The resized image could not be encoded.
    #[error("Could not encode image: {0}")]
    Encode(#[source] ::image::ImageError),
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// An encoded image ready to be sent inline.
pub struct EncodedImage {
    /// `data:<mime>;base64,<payload>` URL.
    pub data_url: String,
    /// Width after resizing.
    pub width: u32,
    /// Height after resizing.
    pub height: u32,
}

/// Loads an image and produces a bounded, encoded copy of it.
pub trait Rasterizer {
    /// Encodes `file` so that neither dimension exceeds `max_edge_pixels`.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be read, decoded or encoded.
    fn rasterize_bounded(
        &self,
        file: &Path,
        max_edge_pixels: u32,
    ) -> Result<EncodedImage, RasterizeError>;
}

/// [`Rasterizer`] backed by the `image` crate, emitting JPEG.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRasterizer;

impl Rasterizer for ImageRasterizer {
    fn rasterize_bounded(
        &self,
        file: &Path,
        max_edge_pixels: u32,
    ) -> Result<EncodedImage, RasterizeError> {
        let img = ::image::open(file).map_err(|source| RasterizeError::Decode {
            path: file.display().to_string(),
            source,
        })?;
        encode_bounded(&img, max_edge_pixels)
    }
}

/// Resizes `img` to fit `max_edge_pixels` and encodes it as a JPEG data URL.
///
/// # Errors
///
/// Returns an error if JPEG encoding fails.
pub fn encode_bounded(img: &DynamicImage, max_edge_pixels: u32) -> Result<EncodedImage, RasterizeError> {
    let (width, height) = img.dimensions();
    let (target_w, target_h) = bounded_dimensions(width, height, max_edge_pixels);

    let resized = if (target_w, target_h) == (width, height) {
        img.clone()
    } else {
        img.resize_exact(target_w, target_h, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)
        .map_err(RasterizeError::Encode)?;

    Ok(EncodedImage {
        data_url: format!(
            "data:image/jpeg;base64,{}",
            BASE64_STANDARD.encode(buf.into_inner())
        ),
        width: target_w,
        height: target_h,
    })
}

#[must_use]
/// Scales `(width, height)` so the longest edge is at most `max_edge`, keeping aspect ratio.
///
/// Dimensions are rounded to the nearest pixel and never drop below 1.
pub fn bounded_dimensions(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }

    let scale = f64::from(max_edge) / f64::from(longest);
    let fit = |edge: u32| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (f64::from(edge) * scale).round() as u32;
        scaled.clamp(1, max_edge.max(1))
    };
    (fit(width), fit(height))
}

#[cfg(test)]
#[path = "tests/raster.rs"]
mod tests;
