use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPool;
use tracing::info;
use uuid::Uuid;

/// Represents a comment on a post
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
}

const COMMENT_COLUMNS: &str = "comment_id, post_id, user_id, content, created_at_utc";

impl Comment {
    /// Create a new comment on a post
    pub async fn create(
        pool: &PgPool,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> sqlx::Result<Comment> {
        let comment = sqlx::query_as::<_, Comment>(&format!(
            "INSERT INTO comments (post_id, user_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COMMENT_COLUMNS}"
        ))
        .bind(post_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        info!(
            "Created comment {} on post {} for user {}",
            comment.comment_id, post_id, user_id
        );

        Ok(comment)
    }

    /// Get a comment by its ID
    pub async fn get_by_id(pool: &PgPool, comment_id: Uuid) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = $1"
        ))
        .bind(comment_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete this comment
    pub async fn delete(&self, pool: &PgPool) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM comments WHERE comment_id = $1")
            .bind(self.comment_id)
            .execute(pool)
            .await?;

        info!("Deleted comment {}", self.comment_id);

        Ok(())
    }
}
