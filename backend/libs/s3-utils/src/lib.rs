/// Shared S3 utilities for media storage
///
/// Provides the AWS S3 client wrapper, bucket configuration with URL/key
/// mapping, and the object operations the story service needs.
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::Client;
use std::sync::Arc;

pub mod config;
pub mod error;
pub mod operations;

pub use config::S3Config;
pub use error::{S3Error, S3Result};
pub use operations::S3Operations;

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create a client for the configured bucket using the default credential chain
    pub async fn connect(config: S3Config) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if config.endpoint.is_some() {
            // S3-compatible stores generally do not support virtual-hosted buckets
            builder = builder.force_path_style(true);
        }

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Object operations bound to this client's bucket
    pub fn operations(&self) -> S3Operations {
        S3Operations::new(self.client.clone(), self.config.clone())
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> S3Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Unreachable {
                bucket: self.config.bucket.clone(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }
}
