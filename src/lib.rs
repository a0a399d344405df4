//! Image resize-and-store service
//!
//! Accepts an uploaded PNG/JPEG/GIF over HTTP, scales it by a percentage,
//! stores the result in an S3 bucket under `uploads/<name>` and serves it
//! back by name.

pub mod app;
pub mod error;
pub mod filename;
pub mod image;
pub mod models;
pub mod routes;
pub mod store;

pub use error::{Error, Result};
