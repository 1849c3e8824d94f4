//! In-memory stores for integration tests
//!
//! Hand-written fakes for the repository and media seams so the HTTP surface
//! can be exercised without PostgreSQL or S3.

#![allow(dead_code)]

pub mod fakes;

use actix_web::web;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use s3_utils::S3Config;
use std::sync::Arc;
use story_service::config::StoriesConfig;
use story_service::handlers::HealthState;
use story_service::middleware::Claims;
use story_service::services::{StoriesService, StoryStores};
use uuid::Uuid;

pub use fakes::{FakeMediaStore, FakeOrphanLedger, FakeStoryRepository, FakeUserRepository};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const BUCKET: &str = "nova-stories-test";

/// Every fake behind the service, kept around for assertions
#[derive(Clone, Default)]
pub struct World {
    pub stories: FakeStoryRepository,
    pub users: FakeUserRepository,
    pub media: FakeMediaStore,
    pub orphans: FakeOrphanLedger,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket() -> S3Config {
        S3Config::new(BUCKET, "us-east-1")
    }

    pub fn service(&self, settings: StoriesConfig) -> web::Data<StoriesService> {
        let stores = StoryStores {
            stories: Arc::new(self.stories.clone()),
            users: Arc::new(self.users.clone()),
            media: Arc::new(self.media.clone()),
            orphans: Arc::new(self.orphans.clone()),
        };
        web::Data::new(StoriesService::new(stores, Self::bucket(), settings))
    }

    pub fn health() -> web::Data<HealthState> {
        web::Data::new(HealthState::new())
    }
}

pub fn bearer(user_id: Uuid) -> (&'static str, String) {
    let claims = Claims {
        sub: user_id.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("token encodes");
    ("Authorization", format!("Bearer {}", token))
}

/// Hand-built multipart body with a single file field
pub fn multipart_body(
    field: &str,
    file_name: &str,
    content_type: &str,
    bytes: &[u8],
) -> (String, Vec<u8>) {
    let boundary = "----nova-story-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}
