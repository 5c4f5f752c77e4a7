use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPool;
use tracing::info;
use uuid::Uuid;

/// Represents a user in the system
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    /// bcrypt hash, never serialized
    pub password_hash: String,
    pub bio: Option<String>,
    pub created_at_utc: DateTime<Utc>,
    pub updated_at_utc: DateTime<Utc>,
}

/// The shape of a user in responses visible to other users.
#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

/// The shape of a user in responses to the account owner. Adds the email;
/// still never the hash.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub created_at_utc: DateTime<Utc>,
}

/// Profile fields a `PUT /api/users/me` may change. `None` leaves the
/// column untouched.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password_hash: Option<String>,
}

const USER_COLUMNS: &str =
    "user_id, username, email, password_hash, bio, created_at_utc, updated_at_utc";

impl User {
    pub fn profile(&self) -> Profile {
        Profile {
            user_id: self.user_id,
            username: self.username.clone(),
            bio: self.bio.clone(),
            created_at_utc: self.created_at_utc,
        }
    }

    pub fn account(&self) -> Account {
        Account {
            user_id: self.user_id,
            username: self.username.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            created_at_utc: self.created_at_utc,
        }
    }

    /// Create a new user. A duplicate username or email surfaces as a
    /// unique-constraint violation for the caller to map.
    pub async fn create(
        pool: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        info!("Created new user with ID: {}", user.user_id);

        Ok(user)
    }

    /// Get a user by their ID
    pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Get a user by their username
    pub async fn get_by_username(pool: &PgPool, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Apply profile changes and refresh this struct from the returned row.
    /// An omitted field keeps its current value.
    pub async fn update_profile(
        &mut self,
        pool: &PgPool,
        changes: &ProfileChanges,
    ) -> sqlx::Result<()> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users
             SET username = COALESCE($1, username),
                 email = COALESCE($2, email),
                 bio = COALESCE($3, bio),
                 password_hash = COALESCE($4, password_hash),
                 updated_at_utc = NOW()
             WHERE user_id = $5
             RETURNING {USER_COLUMNS}"
        ))
        .bind(changes.username.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.bio.as_deref())
        .bind(changes.password_hash.as_deref())
        .bind(self.user_id)
        .fetch_one(pool)
        .await?;

        info!("Updated profile for user {}", self.user_id);
        *self = user;

        Ok(())
    }
}
