//! Error handling and custom error types
//!
//! Every pipeline stage returns a typed failure; the HTTP boundary turns it
//! into a status code and a JSON `{"error": ...}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ErrorBody;

/// Client-caused rejections of an upload or download request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BadRequest {
    #[error("No image part in the request")]
    MissingImage,

    #[error("No selected image")]
    EmptyFilename,

    #[error("Unsupported file type")]
    UnsupportedType,

    #[error("Filename is not usable as a storage name")]
    InvalidFilename,

    #[error("Malformed upload form: {0}")]
    MalformedForm(String),
}

/// Failures of the object store client.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("object store unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the image transform engine.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("invalid scale: {0}")]
    InvalidScale(String),

    #[error("could not decode image: {0}")]
    DecodeFailed(String),

    #[error("could not encode image: {0}")]
    EncodeFailed(String),

    #[error("image task failed: {0}")]
    Internal(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    BadRequest(#[from] BadRequest),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Transform(TransformError::InvalidScale(_)) => StatusCode::BAD_REQUEST,
            Error::Transform(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Store(StoreError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client.
    ///
    /// Store transport failures and configuration problems are reduced to a
    /// generic line; the full error only goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest(kind) => kind.to_string(),
            Error::PayloadTooLarge(msg) => format!("Upload too large: {}", msg),
            Error::Transform(TransformError::InvalidScale(msg)) => {
                format!("Invalid scale: {}", msg)
            }
            Error::Transform(TransformError::Internal(_)) => {
                "Upload failed: image processing was interrupted".to_string()
            }
            Error::Transform(e) => format!("Upload failed: {}", e),
            Error::Store(StoreError::NotFound { key }) => {
                let name = key.rsplit('/').next().unwrap_or(key);
                format!("Download failed: {} not found", name)
            }
            Error::Store(StoreError::Unavailable(_)) => {
                "Object storage is unavailable".to_string()
            }
            Error::Config(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match &self {
            Error::Transform(TransformError::InvalidScale(_)) | Error::BadRequest(_) => {
                tracing::debug!("Client error: {}", self);
            }
            Error::PayloadTooLarge(_) | Error::Store(StoreError::NotFound { .. }) => {
                tracing::warn!("Request rejected: {}", self);
            }
            Error::Transform(_) | Error::Store(_) | Error::Config(_) => {
                tracing::error!("Request failed: {}", self);
            }
        }

        let body = ErrorBody {
            error: self.user_message(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            Error::from(BadRequest::UnsupportedType).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(TransformError::InvalidScale("0".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::from(TransformError::DecodeFailed("junk".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::from(StoreError::NotFound {
                key: "uploads/a.png".into()
            })
            .status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::from(StoreError::Unavailable("timeout".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_user_message_hides_store_detail() {
        let err = Error::from(StoreError::Unavailable(
            "dispatch failure: secret-host.internal".into(),
        ));
        assert!(!err.user_message().contains("secret-host"));
    }

    #[test]
    fn test_not_found_message_names_file_only() {
        let err = Error::from(StoreError::NotFound {
            key: "uploads/cat.png".into(),
        });
        assert_eq!(err.user_message(), "Download failed: cat.png not found");
    }
}
