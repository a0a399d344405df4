use super::{ObjectStore, StoredObject};
use crate::error::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-process store with the same overwrite semantics as the bucket.
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    put_count: Arc<Mutex<usize>>,
    get_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            put_count: Arc::new(Mutex::new(0)),
            get_count: Arc::new(Mutex::new(0)),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_object(self, key: &str, payload: Vec<u8>, content_type: &str) -> Self {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                payload,
                content_type: content_type.to_string(),
            },
        );
        self
    }

    /// Make every subsequent call fail as if the backend were unreachable.
    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn get_put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }

    pub fn get_get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if *self.should_fail.lock().unwrap() {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, payload: &[u8], content_type: &str) -> Result<(), StoreError> {
        *self.put_count.lock().unwrap() += 1;
        self.check_available()?;

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                key: key.to_string(),
                payload: payload.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        *self.get_count.lock().unwrap() += 1;
        self.check_available()?;

        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|object| object.payload.clone())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_put_and_get() {
        let store = MemoryStore::new();

        store
            .put("uploads/a.png", b"first", "image/png")
            .await
            .unwrap();

        assert_eq!(store.get("uploads/a.png").await.unwrap(), b"first");
        assert_eq!(store.get_put_count(), 1);
        assert_eq!(store.get_get_count(), 1);
        assert_eq!(
            store.object("uploads/a.png").unwrap().content_type,
            "image/png"
        );
    }

    #[tokio::test]
    async fn test_memory_store_last_write_wins() {
        let store = MemoryStore::new();

        store.put("uploads/a.png", b"one", "image/png").await.unwrap();
        store.put("uploads/a.png", b"two", "image/png").await.unwrap();

        assert_eq!(store.get("uploads/a.png").await.unwrap(), b"two");
        assert_eq!(store.keys(), vec!["uploads/a.png".to_string()]);
    }

    #[tokio::test]
    async fn test_memory_store_missing_key_is_not_found() {
        let store = MemoryStore::new();

        let err = store.get("uploads/missing.png").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key } if key == "uploads/missing.png"));
    }

    #[tokio::test]
    async fn test_memory_store_failure_keeps_previous_object() {
        let store = MemoryStore::new().with_object("uploads/a.png", b"old".to_vec(), "image/png");
        let failing = store.clone().with_failure(true);

        let err = failing
            .put("uploads/a.png", b"new", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        assert_eq!(store.object("uploads/a.png").unwrap().payload, b"old");
    }
}
