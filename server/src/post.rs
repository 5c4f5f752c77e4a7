use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPool;
use tracing::info;
use uuid::Uuid;

/// Represents a post in the system
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

const POST_COLUMNS: &str = "post_id, user_id, content, created_at_utc, updated_at_utc";

impl Post {
    /// Create a new post for a user
    pub async fn create(pool: &PgPool, user_id: Uuid, content: &str) -> sqlx::Result<Post> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "INSERT INTO posts (user_id, content)
             VALUES ($1, $2)
             RETURNING {POST_COLUMNS}"
        ))
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        info!("Created post {} for user {}", post.post_id, user_id);

        Ok(post)
    }

    /// Get a post by its ID
    pub async fn get_by_id(pool: &PgPool, post_id: Uuid) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE post_id = $1"
        ))
        .bind(post_id)
        .fetch_optional(pool)
        .await
    }

    /// Delete this post. Its comments go with it via the FK cascade.
    pub async fn delete(&self, pool: &PgPool) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM posts WHERE post_id = $1")
            .bind(self.post_id)
            .execute(pool)
            .await?;

        info!("Deleted post {}", self.post_id);

        Ok(())
    }

    /// All of a user's posts, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Post>> {
        sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts
             WHERE user_id = $1
             ORDER BY created_at_utc DESC, post_id DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
