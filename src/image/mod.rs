//! Percentage resize of uploaded images
//!
//! Decodes PNG, JPEG or GIF bytes, scales both axes by the same integer
//! percentage and re-encodes in the format that was decoded.

pub mod processor;

pub use processor::{resize_image, target_dimensions, ImageProcessor, MAX_OUTPUT_PIXELS};

use crate::error::TransformError;
use async_trait::async_trait;
use bytes::Bytes;
use image::ImageFormat;

/// Formats accepted for decoding; output always reuses the decoded one.
pub const SUPPORTED_FORMATS: [ImageFormat; 3] =
    [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait ImageService: Send + Sync {
    async fn resize(&self, input: Bytes, scale_percent: i64) -> Result<ResizedImage, TransformError>;
}
