use super::UserRepository;
use crate::error::Result;
use crate::models::{FollowerEdge, FollowingEdge, SocialGraph, UserProfile};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// Users and follow edges as written by the identity and graph services.
/// A `follows` row `(follower_id, following_id)` is a follower edge for
/// `following_id` and a following edge for `follower_id`.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn followers(&self, user_id: Uuid) -> Result<Vec<FollowerEdge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, follower_id, created_at
            FROM follows
            WHERE following_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| FollowerEdge {
                id: row.get("id"),
                follower_id: row.get("follower_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn followings(&self, user_id: Uuid) -> Result<Vec<FollowingEdge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, following_id, created_at
            FROM follows
            WHERE follower_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| FollowingEdge {
                id: row.get("id"),
                target_id: row.get("following_id"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>> {
        let row = sqlx::query(
            r#"SELECT id, username, created_at FROM users WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| UserProfile {
            id: row.get("id"),
            username: row.get("username"),
            created_at: row.get("created_at"),
        }))
    }

    async fn find_social_graph(&self, id: Uuid) -> Result<Option<SocialGraph>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let followers = self.followers(id).await?;
        let followings = self.followings(id).await?;

        Ok(Some(SocialGraph {
            user,
            followers,
            followings,
        }))
    }
}
