//! Data models and structures
//!
//! Process-wide configuration plus the JSON bodies exchanged with clients.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
}

// Configuration
#[derive(Clone)]
pub struct Config {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub endpoint_url: Option<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let mut require = |name: &'static str| match get(name) {
            Some(value) => value,
            None => {
                missing.push(name);
                String::new()
            }
        };

        let region = require("AWS_REGION");
        let access_key_id = require("AWS_ACCESS_KEY_ID");
        let secret_access_key = require("AWS_SECRET_ACCESS_KEY");
        let bucket = require("AWS_BUCKET_NAME");

        if !missing.is_empty() {
            return Err(crate::Error::Config(format!(
                "missing environment variables: {}",
                missing.join(", ")
            )));
        }

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(raw) => raw.trim().parse().map_err(|_| {
                crate::Error::Config(format!("MAX_UPLOAD_BYTES is not a byte count: {}", raw))
            })?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            region,
            access_key_id,
            secret_access_key,
            bucket,
            endpoint_url: get("AWS_ENDPOINT_URL"),
            max_upload_bytes,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("endpoint_url", &self.endpoint_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
