//! HTTP surface: landing page, multipart upload, attachment download.

use crate::app::{App, ImagePart, UploadRequest};
use crate::error::BadRequest;
use crate::models::UploadResponse;
use crate::{Error, Result};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

const INDEX_HTML: &str = include_str!("../templates/index.html");

pub fn router(app: App, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download/{filename}", get(download))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

fn form_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(e.body_text())
    } else {
        BadRequest::MalformedForm(e.body_text()).into()
    }
}

async fn upload(
    State(app): State<App>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    // A body that is not multipart cannot carry the image part
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected upload body: {}", e);
        BadRequest::MissingImage
    })?;
    let mut request = UploadRequest::default();

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(form_error)?;
                request.image = Some(ImagePart {
                    filename,
                    content_type,
                    data,
                });
            }
            "scale" => {
                request.scale = Some(field.text().await.map_err(form_error)?);
            }
            other => {
                tracing::debug!("Ignoring form field {:?}", other);
            }
        }
    }

    Ok(Json(app.upload(request).await?))
}

async fn download(
    State(app): State<App>,
    filename: std::result::Result<Path<String>, PathRejection>,
) -> Result<Response> {
    let Path(filename) = filename.map_err(|e| {
        tracing::debug!("Rejected download path: {}", e);
        BadRequest::InvalidFilename
    })?;
    let result = app.download(&filename).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, result.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", result.filename),
            ),
        ],
        result.data,
    )
        .into_response())
}
