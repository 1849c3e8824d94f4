/// Object-level S3 operations used for story media
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use std::sync::Arc;

use crate::config::S3Config;
use crate::error::{S3Error, S3Result};

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Upload an object. Public URLs come from [`S3Config::object_url`].
    pub async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> S3Result<()> {
        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Upload {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(bucket = %self.config.bucket, %key, "uploaded object");
        Ok(())
    }

    /// Delete an object by key
    pub async fn delete_object(&self, key: &str) -> S3Result<()> {
        self.client
            .delete_object()
            .bucket(&self.config.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| S3Error::Delete {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        tracing::debug!(bucket = %self.config.bucket, %key, "deleted object");
        Ok(())
    }
}
