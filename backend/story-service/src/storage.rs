//! Object storage seam for story media.
//!
//! The stories service only needs to put and delete objects by key; URL
//! construction stays with [`s3_utils::S3Config`].

use async_trait::async_trait;
use s3_utils::{S3Operations, S3Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> S3Result<()>;

    async fn delete_object(&self, key: &str) -> S3Result<()>;
}

#[async_trait]
impl MediaStore for S3Operations {
    async fn put_object(&self, key: &str, body: Vec<u8>, content_type: &str) -> S3Result<()> {
        S3Operations::put_object(self, key, body, content_type).await
    }

    async fn delete_object(&self, key: &str) -> S3Result<()> {
        S3Operations::delete_object(self, key).await
    }
}
