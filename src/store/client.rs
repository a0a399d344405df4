use super::ObjectStore;
use crate::error::StoreError;
use crate::models::Config;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, Client as S3Client};
use tracing::debug;

pub struct S3Store {
    client: S3Client,
    bucket: String,
}

impl S3Store {
    pub async fn new(config: &Config) -> Self {
        let credentials = aws_sdk_s3::config::Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "pixbucket-env",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (MinIO, Spaces, ...) generally expect path-style addressing
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(&self, key: &str, payload: &[u8], content_type: &str) -> Result<(), StoreError> {
        let body = ByteStream::from(payload.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                StoreError::Unavailable(format!(
                    "Failed to upload {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!("Stored {} bytes at s3://{}/{}", payload.len(), self.bucket, key);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetObjectError::NoSuchKey(_) => StoreError::NotFound {
                    key: key.to_string(),
                },
                other => StoreError::Unavailable(format!(
                    "Failed to read {}: {}",
                    key,
                    DisplayErrorContext(&other)
                )),
            })?;

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to read body: {}", e)))?;

        Ok(bytes.to_vec())
    }
}
