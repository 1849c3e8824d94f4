/// Story Service Library
///
/// Stories are short-lived media posts: each one references an image or video
/// object in the media bucket and is owned by a single user.
///
/// # Modules
///
/// - `handlers`: HTTP routes for stories, health and docs
/// - `services`: Story listing, creation and deletion logic
/// - `db`: Repository traits and their PostgreSQL implementations
/// - `storage`: Media object store seam over S3
/// - `jobs`: Orphaned media sweeper
/// - `middleware`: JWT authentication and request metrics
/// - `models`: Stories, users, follow edges and response envelopes
/// - `error`: Error types and HTTP mapping
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
