//! Integration Tests: PostgreSQL repositories
//!
//! Runs against the database in `DATABASE_URL` after applying the embedded
//! migrations. Skipped when the variable is not set.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use story_service::db::{
    self, OrphanedMediaRepository, PgOrphanedMediaRepository, PgStoryRepository,
    PgUserRepository, StoryRepository, UserRepository,
};
use story_service::models::NewStory;
use std::time::Duration;
use uuid::Uuid;

/// Keeps `NOW()` strictly increasing between consecutive writes
async fn tick() {
    tokio::time::sleep(Duration::from_millis(2)).await;
}

async fn setup_pool() -> Option<PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping PostgreSQL repository test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    db::migrate(&pool).await.expect("apply migrations");
    Some(pool)
}

async fn create_user(pool: &PgPool, prefix: &str) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username) VALUES ($1, $2)")
        .bind(id)
        .bind(format!("{}-{}", prefix, id.simple()))
        .execute(pool)
        .await
        .expect("insert user");
    id
}

async fn follow(pool: &PgPool, follower: Uuid, following: Uuid) {
    sqlx::query("INSERT INTO follows (follower_id, following_id) VALUES ($1, $2)")
        .bind(follower)
        .bind(following)
        .execute(pool)
        .await
        .expect("insert follow");
    tick().await;
}

#[tokio::test]
async fn story_repository_roundtrip() {
    let Some(pool) = setup_pool().await else {
        return;
    };
    let repo = PgStoryRepository::new(pool.clone());
    let owner = create_user(&pool, "owner").await;

    let first = repo
        .insert(NewStory {
            user_id: owner,
            url: "https://bucket.s3.amazonaws.com/stories/a.jpg".to_string(),
        })
        .await
        .unwrap();
    tick().await;
    let second = repo
        .insert(NewStory {
            user_id: owner,
            url: "https://bucket.s3.amazonaws.com/stories/b.jpg".to_string(),
        })
        .await
        .unwrap();

    let mine = repo.find_by_owner(owner).await.unwrap();
    assert_eq!(mine.iter().map(|s| s.id).collect::<Vec<_>>(), vec![first.id, second.id]);

    let by_owners = repo.find_by_owners(&[owner, owner]).await.unwrap();
    assert_eq!(by_owners.len(), 2);

    assert_eq!(repo.find_by_id(first.id).await.unwrap(), Some(first.clone()));
    assert!(repo.delete(first.id).await.unwrap());
    assert!(!repo.delete(first.id).await.unwrap());
    assert_eq!(repo.find_by_id(first.id).await.unwrap(), None);
}

#[tokio::test]
async fn user_repository_loads_both_edge_sets() {
    let Some(pool) = setup_pool().await else {
        return;
    };
    let repo = PgUserRepository::new(pool.clone());

    let me = create_user(&pool, "me").await;
    let a = create_user(&pool, "a").await;
    let b = create_user(&pool, "b").await;
    let c = create_user(&pool, "c").await;
    follow(&pool, a, me).await;
    follow(&pool, b, me).await;
    follow(&pool, me, b).await;
    follow(&pool, me, c).await;

    let graph = repo.find_social_graph(me).await.unwrap().unwrap();
    assert_eq!(
        graph.followers.iter().map(|e| e.follower_id).collect::<Vec<_>>(),
        vec![a, b]
    );
    assert_eq!(
        graph.followings.iter().map(|e| e.target_id).collect::<Vec<_>>(),
        vec![b, c]
    );

    assert!(repo.find_social_graph(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn orphan_ledger_tracks_attempts() {
    let Some(pool) = setup_pool().await else {
        return;
    };
    let repo = PgOrphanedMediaRepository::new(pool.clone());
    let key = format!("stories/{}/orphan.jpg", Uuid::new_v4());

    repo.record(&key, "timeout").await.unwrap();
    let entry = repo
        .list_pending(1000)
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.object_key == key)
        .expect("entry recorded");
    assert_eq!(entry.attempts, 0);

    repo.mark_failed(entry.id, "still down").await.unwrap();
    let entry = repo
        .list_pending(1000)
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.object_key == key)
        .expect("entry kept");
    assert_eq!(entry.attempts, 1);
    assert_eq!(entry.reason, "still down");

    repo.resolve(entry.id).await.unwrap();
    assert!(repo
        .list_pending(1000)
        .await
        .unwrap()
        .iter()
        .all(|e| e.object_key != key));
}

#[tokio::test]
async fn orphan_ledger_puts_retried_entries_behind_fresh_ones() {
    let Some(pool) = setup_pool().await else {
        return;
    };
    let repo = PgOrphanedMediaRepository::new(pool.clone());
    let denied = format!("stories/{}/denied.jpg", Uuid::new_v4());
    let fresh = format!("stories/{}/fresh.jpg", Uuid::new_v4());

    repo.record(&denied, "AccessDenied").await.unwrap();
    tick().await;
    repo.record(&fresh, "timeout").await.unwrap();

    let denied_id = repo
        .list_pending(10_000)
        .await
        .unwrap()
        .into_iter()
        .find(|e| e.object_key == denied)
        .expect("entry recorded")
        .id;
    repo.mark_failed(denied_id, "AccessDenied").await.unwrap();

    let pending = repo.list_pending(10_000).await.unwrap();
    let position = |key: &str| pending.iter().position(|e| e.object_key == key);
    let (Some(fresh_at), Some(denied_at)) = (position(&fresh), position(&denied)) else {
        panic!("both entries should be pending");
    };
    assert!(fresh_at < denied_at);
    assert!(pending[denied_at].last_attempt_at.is_some());
}
