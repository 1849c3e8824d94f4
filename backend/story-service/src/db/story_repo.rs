use super::StoryRepository;
use crate::error::Result;
use crate::models::{NewStory, Story};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgStoryRepository {
    pool: PgPool,
}

impl PgStoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_story(row: &PgRow) -> Story {
        Story {
            id: row.get("id"),
            user_id: row.get("user_id"),
            url: row.get("url"),
            created_at: row.get("created_at"),
        }
    }
}

#[async_trait]
impl StoryRepository for PgStoryRepository {
    async fn insert(&self, story: NewStory) -> Result<Story> {
        let row = sqlx::query(
            r#"
            INSERT INTO stories (id, user_id, url, created_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, user_id, url, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(story.user_id)
        .bind(&story.url)
        .fetch_one(&self.pool)
        .await?;

        Ok(Self::row_to_story(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Story>> {
        let row = sqlx::query(r#"SELECT id, user_id, url, created_at FROM stories WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(Self::row_to_story))
    }

    async fn find_all(&self) -> Result<Vec<Story>> {
        let rows = sqlx::query(
            r#"SELECT id, user_id, url, created_at FROM stories ORDER BY created_at ASC, id ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_story).collect())
    }

    async fn find_by_owner(&self, user_id: Uuid) -> Result<Vec<Story>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, url, created_at
            FROM stories
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_story).collect())
    }

    async fn find_by_owners(&self, user_ids: &[Uuid]) -> Result<Vec<Story>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, url, created_at
            FROM stories
            WHERE user_id = ANY($1)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(Self::row_to_story).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM stories WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
