use super::OrphanedMediaRepository;
use crate::error::Result;
use crate::models::OrphanedMedia;
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgOrphanedMediaRepository {
    pool: PgPool,
}

impl PgOrphanedMediaRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrphanedMediaRepository for PgOrphanedMediaRepository {
    async fn record(&self, object_key: &str, reason: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orphaned_media (id, object_key, reason, attempts, created_at)
            VALUES ($1, $2, $3, 0, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(object_key)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_pending(&self, limit: i64) -> Result<Vec<OrphanedMedia>> {
        let rows = sqlx::query(
            r#"
            SELECT id, object_key, reason, attempts, created_at, last_attempt_at
            FROM orphaned_media
            ORDER BY last_attempt_at ASC NULLS FIRST, created_at ASC, id ASC
            LIMIT $1
            "#,
        )
        .bind(limit.max(1))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| OrphanedMedia {
                id: row.get("id"),
                object_key: row.get("object_key"),
                reason: row.get("reason"),
                attempts: row.get("attempts"),
                created_at: row.get("created_at"),
                last_attempt_at: row.get("last_attempt_at"),
            })
            .collect())
    }

    async fn resolve(&self, id: Uuid) -> Result<()> {
        sqlx::query(r#"DELETE FROM orphaned_media WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orphaned_media
            SET attempts = attempts + 1, reason = $2, last_attempt_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
