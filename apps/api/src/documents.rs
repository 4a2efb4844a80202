//! Document Store: binary uploads that come back as a retrievable URL.
//!
//! Résumés are stored in the S3 / MinIO bucket configured at startup under
//! `cvs/{candidate_id}_{uuid}.{ext}`.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub const RESUME_PREFIX: &str = "cvs";
pub const DEFAULT_EXTENSION: &str = "pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of '{key}' failed: {message}")]
    Upload { key: String, message: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `body` under `key` and returns the URL it can be fetched from.
    async fn upload(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<String, StorageError>;
}

/// Unique object key for a candidate's résumé. The extension comes from the uploaded
/// file name, lower-cased, and defaults to `pdf`.
pub fn resume_key(candidate_id: Uuid, file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());

    format!("{RESUME_PREFIX}/{candidate_id}_{}.{extension}", Uuid::new_v4())
}

#[derive(Clone)]
pub struct S3DocumentStore {
    client: S3Client,
    bucket: String,
    public_url: String,
}

impl S3DocumentStore {
    pub fn new(client: S3Client, bucket: String, public_url: String) -> Self {
        Self {
            client,
            bucket,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    /// Path-style URL, which works for both MinIO and AWS.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_url, self.bucket, key)
    }
}

#[async_trait]
impl DocumentStore for S3DocumentStore {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(self.object_url(key))
    }
}
