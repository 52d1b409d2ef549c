/// Postgres adapter for `PostStore`.
use crate::db::{FeedCursor, PostStore};
use crate::error::{AppError, Result};
use crate::models::Post;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

const POST_COLUMNS: &str = "id, user_id, image_key, description, seq_id, created_at, expires_at";

pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_post(row: &PgRow) -> std::result::Result<Post, sqlx::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            image_key: row.try_get("image_key")?,
            description: row.try_get("description")?,
            seq_id: row.try_get("seq_id")?,
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert_post(
        &self,
        user_id: Uuid,
        image_key: &str,
        description: Option<&str>,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Post> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO posts (user_id, image_key, description, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(image_key)
        .bind(description)
        .bind(created_at)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_post(&row).map_err(AppError::from)
    }

    async fn latest_unexpired_for_user(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Post>> {
        let row_opt = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE user_id = $1 AND expires_at > $2
            ORDER BY created_at DESC, seq_id DESC
            LIMIT 1
            "#,
        ))
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(row) => Ok(Some(Self::row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_post_by_id(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row_opt = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS}
            FROM posts
            WHERE id = $1
            "#,
        ))
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        match row_opt {
            Some(row) => Ok(Some(Self::row_to_post(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_unexpired(
        &self,
        now: DateTime<Utc>,
        limit: i64,
        before: Option<FeedCursor>,
    ) -> Result<Vec<Post>> {
        // DISTINCT ON keeps only the newest row per owner; the outer query
        // applies the cursor and the global feed ordering.
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM (
                SELECT DISTINCT ON (user_id) {POST_COLUMNS}
                FROM posts
                WHERE expires_at > $1
                ORDER BY user_id, created_at DESC, seq_id DESC
            ) p
            WHERE $2::timestamptz IS NULL OR (p.created_at, p.seq_id) < ($2, $3)
            ORDER BY p.created_at DESC, p.seq_id DESC
            LIMIT $4
            "#,
        ))
        .bind(now)
        .bind(before.map(|c| c.created_at))
        .bind(before.map(|c| c.seq_id).unwrap_or(0))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        // A malformed row is skipped and logged rather than failing the page.
        let posts = rows
            .iter()
            .filter_map(|row| match Self::row_to_post(row) {
                Ok(post) => Some(post),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed post row in feed query");
                    None
                }
            })
            .collect();

        Ok(posts)
    }
}
