/// Database access layer
///
/// Repository traits are the seams the stories service depends on; the
/// PostgreSQL implementations live next to them. Keeping the traits object-safe
/// lets handlers run against in-memory stores in tests.
pub mod orphan_repo;
pub mod story_repo;
pub mod user_repo;

pub use orphan_repo::PgOrphanedMediaRepository;
pub use story_repo::PgStoryRepository;
pub use user_repo::PgUserRepository;

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::models::{NewStory, OrphanedMedia, SocialGraph, Story, UserProfile};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use uuid::Uuid;

/// Story persistence. Every listing returns stories in store order,
/// ascending `(created_at, id)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryRepository: Send + Sync {
    async fn insert(&self, story: NewStory) -> Result<Story>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>>;

    async fn find_all(&self) -> Result<Vec<Story>>;

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Story>>;

    /// Stories owned by any of `user_ids`. Each story is returned once no
    /// matter how often its owner appears in the slice.
    async fn find_by_owners(&self, user_ids: &[Uuid]) -> Result<Vec<Story>>;

    /// Returns `false` when no record matched
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Read access to users and their follow edges
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>>;

    /// The user with follower and following edges populated
    async fn find_social_graph(&self, id: Uuid) -> Result<Option<SocialGraph>>;
}

/// Ledger of media objects left behind by failed deletions
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrphanedMediaRepository: Send + Sync {
    async fn record(&self, object_key: &str, reason: &str) -> Result<()>;

    /// Never-attempted entries first, then the least recently attempted, so
    /// entries that keep failing rotate behind newer ones
    async fn list_pending(&self, limit: i64) -> Result<Vec<OrphanedMedia>>;

    /// The object is gone; drop the entry
    async fn resolve(&self, id: Uuid) -> Result<()>;

    /// Another attempt failed; bump the counter and keep the latest reason
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()>;
}

/// Create the PostgreSQL pool and verify it with a round trip
pub async fn create_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .test_before_acquire(true)
        .connect(&config.url)
        .await?;

    sqlx::query("SELECT 1").execute(&pool).await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database pool created and verified"
    );
    Ok(pool)
}

/// Apply the embedded migrations
pub async fn migrate(pool: &PgPool) -> std::result::Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations completed successfully");
    Ok(())
}
