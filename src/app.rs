//! Upload and download pipelines.
//!
//! Upload: validate → resize → store under `uploads/<name>`.
//! Download: sanitize the requested name → fetch the same key.

use crate::error::{BadRequest, TransformError};
use crate::filename::{has_allowed_extension, sanitize_filename, storage_key};
use crate::image::{ImageProcessor, ImageService};
use crate::models::{Config, UploadResponse};
use crate::store::{ObjectStore, S3Store};
use crate::Result;
use bytes::Bytes;
use std::num::IntErrorKind;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_SCALE_PERCENT: i64 = 100;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Downloads are always labelled PNG, whatever format was stored.
pub const DOWNLOAD_CONTENT_TYPE: &str = "image/png";

/// The file part of an upload form.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub image: Option<ImagePart>,
    pub scale: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
}

/// Read the `scale` form value. Absent or non-numeric input means 100%;
/// an integer too large for `i64` is an invalid scale.
pub fn parse_scale(raw: Option<&str>) -> std::result::Result<i64, TransformError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(DEFAULT_SCALE_PERCENT);
    };

    match raw.parse::<i64>() {
        Ok(scale) => Ok(scale),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            Err(TransformError::InvalidScale(format!("{} is out of range", raw)))
        }
        Err(_) => {
            warn!(
                "Unparseable scale {:?}, using {}%",
                raw, DEFAULT_SCALE_PERCENT
            );
            Ok(DEFAULT_SCALE_PERCENT)
        }
    }
}

/// Shared, read-only handles to the store and the transform engine.
#[derive(Clone)]
pub struct App {
    store: Arc<dyn ObjectStore>,
    image: Arc<dyn ImageService>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub store: Arc<dyn ObjectStore>,
    pub image: Arc<dyn ImageService>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            store: services.store,
            image: services.image,
        }
    }

    /// Construct the app against the configured S3 bucket.
    pub async fn new(config: &Config) -> Self {
        info!(
            "Using bucket {} in {}{}",
            config.bucket,
            config.region,
            config
                .endpoint_url
                .as_deref()
                .map(|e| format!(" via {}", e))
                .unwrap_or_default()
        );

        Self::with_services(AppServices {
            store: Arc::new(S3Store::new(config).await),
            image: Arc::new(ImageProcessor::new()),
        })
    }

    pub async fn upload(&self, request: UploadRequest) -> Result<UploadResponse> {
        let part = request.image.ok_or(BadRequest::MissingImage)?;
        if part.filename.is_empty() {
            return Err(BadRequest::EmptyFilename.into());
        }
        if !has_allowed_extension(&part.filename) {
            return Err(BadRequest::UnsupportedType.into());
        }

        let filename = sanitize_filename(&part.filename);
        if filename.is_empty() || !has_allowed_extension(&filename) {
            return Err(BadRequest::InvalidFilename.into());
        }

        let scale = parse_scale(request.scale.as_deref())?;
        info!(
            "Resizing {} ({} bytes) to {}%",
            filename,
            part.data.len(),
            scale
        );

        let resized = self.image.resize(part.data, scale).await?;
        info!(
            "Resized {} to {}x{} ({:?}, {} bytes)",
            filename,
            resized.width,
            resized.height,
            resized.format,
            resized.data.len()
        );

        let key = storage_key(&filename);
        let content_type = part.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE);
        self.store.put(&key, &resized.data, content_type).await?;
        info!("Stored {}", key);

        Ok(UploadResponse {
            message: format!(
                "Image uploaded, resized to {}%, and stored in object storage.",
                scale
            ),
            filename,
        })
    }

    pub async fn download(&self, requested: &str) -> Result<DownloadResult> {
        let filename = sanitize_filename(requested);
        if filename.is_empty() {
            return Err(BadRequest::InvalidFilename.into());
        }
        if filename != requested {
            warn!("Download name {:?} sanitized to {:?}", requested, filename);
        }

        let key = storage_key(&filename);
        let data = self.store.get(&key).await?;
        info!("Fetched {} ({} bytes)", key, data.len());

        Ok(DownloadResult {
            data,
            filename,
            content_type: DOWNLOAD_CONTENT_TYPE,
        })
    }
}
