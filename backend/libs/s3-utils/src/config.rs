/// S3 configuration shared by services that store media
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Custom endpoint for S3-compatible storage (MinIO, localstack)
    pub endpoint: Option<String>,
}

impl S3Config {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            endpoint: None,
        }
    }

    /// Public prefix every object URL of this bucket starts with, including the
    /// trailing slash.
    pub fn public_url_prefix(&self) -> String {
        format!("https://{}.s3.amazonaws.com/", self.bucket)
    }

    /// Build the public URL of an object
    pub fn object_url(&self, key: &str) -> String {
        format!("{}{}", self.public_url_prefix(), key)
    }

    /// Recover the object key from a URL produced by [`S3Config::object_url`].
    ///
    /// Returns `None` when the URL belongs to another bucket or carries no key.
    pub fn object_key_from_url<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = self.public_url_prefix();
        url.strip_prefix(prefix.as_str()).filter(|key| !key.is_empty())
    }
}
