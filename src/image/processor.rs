use super::{ImageService, ResizedImage, SUPPORTED_FORMATS};
use crate::error::TransformError;
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Upper bound on the pixel count of a resized image.
pub const MAX_OUTPUT_PIXELS: u128 = 40_000_000;

const RESIZE_FILTER: FilterType = FilterType::Triangle;

fn check_scale(scale_percent: i64) -> Result<(), TransformError> {
    if scale_percent <= 0 {
        return Err(TransformError::InvalidScale(format!(
            "scale must be a positive percentage, got {}",
            scale_percent
        )));
    }
    Ok(())
}

/// Scale `width`×`height` by `scale_percent`, truncating both axes.
pub fn target_dimensions(
    width: u32,
    height: u32,
    scale_percent: i64,
) -> Result<(u32, u32), TransformError> {
    check_scale(scale_percent)?;

    let scale = scale_percent as u128;
    let new_width = u128::from(width) * scale / 100;
    let new_height = u128::from(height) * scale / 100;

    if new_width < 1 || new_height < 1 {
        return Err(TransformError::InvalidScale(format!(
            "{}% of {}x{} leaves an empty image",
            scale_percent, width, height
        )));
    }
    let pixels = new_width.checked_mul(new_height);
    if pixels.map_or(true, |p| p > MAX_OUTPUT_PIXELS) {
        return Err(TransformError::InvalidScale(format!(
            "{}% of {}x{} exceeds {} pixels",
            scale_percent, width, height, MAX_OUTPUT_PIXELS
        )));
    }

    // Both axes are bounded by MAX_OUTPUT_PIXELS here
    Ok((new_width as u32, new_height as u32))
}

/// Decode, resize and re-encode in the decoded format.
pub fn resize_image(input: &[u8], scale_percent: i64) -> Result<ResizedImage, TransformError> {
    check_scale(scale_percent)?;

    let reader = ImageReader::new(Cursor::new(input))
        .with_guessed_format()
        .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;
    let format = reader
        .format()
        .ok_or_else(|| TransformError::DecodeFailed("unrecognized image data".to_string()))?;
    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(TransformError::DecodeFailed(format!(
            "unsupported image format {:?}",
            format
        )));
    }

    let img = reader
        .decode()
        .map_err(|e| TransformError::DecodeFailed(e.to_string()))?;

    let (width, height) = target_dimensions(img.width(), img.height(), scale_percent)?;
    let resized = img.resize_exact(width, height, RESIZE_FILTER);

    let data = encode(resized, format)?;

    Ok(ResizedImage {
        data,
        format,
        width,
        height,
    })
}

fn encode(img: DynamicImage, format: ImageFormat) -> Result<Vec<u8>, TransformError> {
    // The JPEG encoder rejects alpha channels
    let img = if format == ImageFormat::Jpeg && img.color().has_alpha() {
        DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        img
    };

    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format)
        .map_err(|e| TransformError::EncodeFailed(format!("{:?}: {}", format, e)))?;
    Ok(buf.into_inner())
}

pub struct ImageProcessor;

impl ImageProcessor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for ImageProcessor {
    async fn resize(
        &self,
        input: Bytes,
        scale_percent: i64,
    ) -> Result<ResizedImage, TransformError> {
        tokio::task::spawn_blocking(move || resize_image(&input, scale_percent))
            .await
            .map_err(|e| TransformError::Internal(format!("resize task join error: {}", e)))?
    }
}
