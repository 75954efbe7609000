use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use thiserror::Error;

use crate::config::AppConfig;

/// Failures from the image host.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of `{key}` failed: {reason}")]
    Upload { key: String, reason: String },
}

/// StorageService
///
/// Contract for the external image host. Handlers hand over the bytes of an
/// uploaded file and get back the public URL it is served from.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket when missing. Only meaningful against a local MinIO.
    async fn ensure_bucket_exists(&self);

    /// Stores `bytes` under `key` and returns the public URL.
    async fn upload_image(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError>;
}

/// S3StorageClient
///
/// `StorageService` over the AWS SDK. Path-style addressing keeps it compatible
/// with MinIO.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    bucket_name: String,
    public_url: String,
}

impl S3StorageClient {
    pub fn new(config: &AppConfig) -> Self {
        let credentials =
            s3::config::Credentials::new(&config.s3_key, &config.s3_secret, None, None, "static");

        let s3_config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .region(s3::config::Region::new(config.s3_region.clone()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(s3_config),
            bucket_name: config.s3_bucket.clone(),
            public_url: config.s3_public_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // Already-exists errors are expected on every start after the first.
        if let Err(err) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!(bucket = %self.bucket_name, error = %err, "create_bucket skipped");
        }
    }

    async fn upload_image(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let key = sanitize_key(key);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(key = %key, "image uploaded");
        Ok(format!("{}/{}", self.public_url, key))
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so a key can never climb out of its prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// In-process `StorageService` for tests. Returns a deterministic URL, or a
/// simulated failure when `should_fail` is set. Clones share the upload count.
#[derive(Clone, Default)]
pub struct MockStorageService {
    pub should_fail: bool,
    uploads: Arc<AtomicUsize>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Successful uploads so far.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload_image(
        &self,
        key: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Upload {
                key: key.to_string(),
                reason: "simulated failure".to_string(),
            });
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}",
            sanitize_key(key)
        ))
    }
}

/// StorageState
///
/// Shared handle stored in application state.
pub type StorageState = Arc<dyn StorageService>;
