//! MinIO/S3-compatible storage client
//!
//! Uses rust-s3 crate for lightweight S3 operations. Documents are never
//! publicly readable; all access goes through the API.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::MinIOConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStore;

/// rust-s3 backed implementation of [`ObjectStore`].
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
}

impl MinIOClient {
    pub fn new(config: MinIOConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Internal(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create MinIO bucket: {}", e)))?;

        // MinIO serves buckets path-style, not as subdomains
        bucket.set_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
        })
    }

    /// Create the bucket if it is missing; existing buckets are fine.
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        match self.create_bucket().await {
            Ok(_) => {
                info!(bucket = %self.bucket.name(), "bucket created");
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!(bucket = %self.bucket.name(), "bucket already exists");
                    Ok(())
                } else {
                    // Restricted credentials cannot always create buckets;
                    // proceed and let the first put surface a real problem
                    warn!(
                        bucket = %self.bucket.name(),
                        "could not create bucket ({}), assuming it exists", e
                    );
                    Ok(())
                }
            }
        }
    }

    async fn create_bucket(&self) -> Result<()> {
        let bucket_config = BucketConfiguration::default();

        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            bucket_config,
        )
        .await
        .map_err(|e| {
            AppError::Internal(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStore for MinIOClient {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        self.bucket
            .put_object_with_content_type(key, &data, content_type)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to upload object '{}': {}", key, e)))?;

        debug!(key, "object stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let response = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to fetch object '{}': {}", key, e)))?;

        debug!(key, bytes = response.bytes().len(), "object fetched");
        Ok(response.to_vec())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to delete object '{}': {}", key, e)))?;

        debug!(key, "object deleted");
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self.bucket.head_object(key).await {
            Ok(_) => Ok(true),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(AppError::Upstream(format!(
                        "Failed to check if object '{}' exists: {}",
                        key, e
                    )))
                }
            }
        }
    }
}
