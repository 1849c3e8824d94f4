/// Errors surfaced by the S3 helpers
use thiserror::Error;

#[derive(Debug, Error)]
pub enum S3Error {
    #[error("failed to upload object {key}: {message}")]
    Upload { key: String, message: String },

    #[error("failed to delete object {key}: {message}")]
    Delete { key: String, message: String },

    #[error("bucket {bucket} is not reachable: {message}")]
    Unreachable { bucket: String, message: String },
}

pub type S3Result<T> = Result<T, S3Error>;
