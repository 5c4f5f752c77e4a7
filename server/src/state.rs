use color_eyre::eyre::{eyre, Context as _};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

/// Secrets shorter than this are trivially brute-forceable for HS256.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
}

impl JwtConfig {
    pub fn from_env() -> color_eyre::Result<Self> {
        let secret =
            std::env::var("JWT_SECRET").wrap_err("JWT_SECRET environment variable not set")?;

        let config = Self { secret };

        config.verify_secret()?;

        Ok(config)
    }

    /// Verify the signing secret is usable before the first request needs it
    pub fn verify_secret(&self) -> color_eyre::Result<()> {
        if self.secret.len() < MIN_SECRET_BYTES {
            return Err(eyre!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_SECRET_BYTES,
                self.secret.len()
            ));
        }

        Ok(())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub jwt: JwtConfig,
}

impl AppState {
    pub async fn from_env() -> color_eyre::Result<Self> {
        let pool = setup_db_pool().await?;
        let jwt = JwtConfig::from_env()?;

        Ok(Self { db: pool, jwt })
    }
}

#[tracing::instrument(err)]
pub async fn setup_db_pool() -> color_eyre::Result<PgPool> {
    const MIGRATION_LOCK_ID: i64 = 0xDB_DB_DB_DB_DB_DB_DB;

    let database_url =
        std::env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable not set")?;
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_ID)
        .execute(&pool)
        .await?;

    sqlx::migrate!("../migrations").run(&pool).await?;

    let unlocked: bool = sqlx::query_scalar("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_ID)
        .fetch_one(&pool)
        .await?;

    if unlocked {
        info!("Migration lock unlocked");
    } else {
        tracing::warn!("Failed to unlock migration lock");
    }

    Ok(pool)
}
