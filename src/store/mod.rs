//! Object store integration for resized uploads
//!
//! Objects live in a single bucket and are addressed by key. Writes replace
//! whatever was stored under the key before; there is no versioning.

pub mod client;
pub mod mock;

pub use client::S3Store;
pub use mock::MemoryStore;

use crate::error::StoreError;
use async_trait::async_trait;

/// A payload as held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub payload: Vec<u8>,
    pub content_type: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `payload` under `key`, overwriting any existing object. One attempt.
    async fn put(&self, key: &str, payload: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// Read the payload under `key`. Absent objects are [`StoreError::NotFound`].
    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;
}
