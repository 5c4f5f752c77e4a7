use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::auth::{self, AuthUser};
use crate::errors::{on_conflict, ApiError, ApiResult};
use crate::password;
use crate::post::Post;
use crate::state::AppState;
use crate::user::{ProfileChanges, User};

const MIN_USERNAME_CHARS: usize = 3;
const MAX_USERNAME_CHARS: usize = 30;
const MIN_PASSWORD_CHARS: usize = 8;
// bcrypt ignores everything past 72 bytes
const MAX_PASSWORD_BYTES: usize = 72;
const MAX_EMAIL_BYTES: usize = 254;
const MAX_BIO_CHARS: usize = 160;

#[derive(Debug, Deserialize)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Create an account and hand back the first token
#[axum_macros::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(params): Json<RegisterParams>,
) -> ApiResult<Json<Value>> {
    let username = validate_username(&params.username)?;
    let email = validate_email(&params.email)?;
    validate_password(&params.password)?;

    let password_hash = password::hash_password(&params.password)?;

    let user = User::create(&state.db, &username, &email, &password_hash)
        .await
        .map_err(on_conflict("username or email is already taken"))?;

    let token = auth::create_token(&state.jwt, &user)?;
    info!("Registered user {}", user.username);

    Ok(Json(json!({ "user": user.account(), "token": token })))
}

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}

/// Valid bcrypt hash of a throwaway password. The unknown-username branch
/// verifies against it so its timing matches a real mismatch.
const DUMMY_HASH: &str = "$2a$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW";

/// Exchange credentials for a token
pub async fn login(
    State(state): State<AppState>,
    Json(params): Json<LoginParams>,
) -> ApiResult<Json<Value>> {
    // An unknown username and a wrong password get the same answer
    let Some(user) = User::get_by_username(&state.db, params.username.trim()).await? else {
        let _ = password::verify_password(&params.password, DUMMY_HASH);
        return Err(bad_credentials());
    };

    if !password::verify_password(&params.password, &user.password_hash)? {
        return Err(bad_credentials());
    }

    let token = auth::create_token(&state.jwt, &user)?;
    info!("User {} logged in", user.username);

    Ok(Json(json!({ "user": user.account(), "token": token })))
}

fn bad_credentials() -> ApiError {
    ApiError::Unauthorized("invalid username or password".into())
}

/// Authenticated no-op: the client uses it to check a stored token
pub async fn verify(AuthUser { user, claims }: AuthUser) -> Json<Value> {
    Json(json!({ "user": user.account(), "expires_at": claims.exp }))
}

/// Public profile: the user plus their posts, newest first
pub async fn profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<Json<Value>> {
    let user = User::get_by_username(&state.db, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no user named {username}")))?;

    let posts = Post::list_for_user(&state.db, user.user_id).await?;

    Ok(Json(json!({ "profile": user.profile(), "posts": posts })))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileParams {
    pub username: Option<String>,
    pub email: Option<String>,
    pub bio: Option<String>,
    pub password: Option<String>,
}

/// Edit the caller's own profile. The claims embed username and email, so
/// the response carries a reissued token.
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser { mut user, .. }: AuthUser,
    Json(params): Json<UpdateProfileParams>,
) -> ApiResult<Json<Value>> {
    let username = params
        .username
        .as_deref()
        .map(validate_username)
        .transpose()?;
    let email = params.email.as_deref().map(validate_email).transpose()?;
    let bio = params.bio.as_deref().map(validate_bio).transpose()?;

    let password_hash = match params.password.as_deref() {
        Some(plain) => {
            validate_password(plain)?;
            Some(password::hash_password(plain)?)
        }
        None => None,
    };

    let changes = ProfileChanges {
        username,
        email,
        bio,
        password_hash,
    };

    user.update_profile(&state.db, &changes)
        .await
        .map_err(on_conflict("username or email is already taken"))?;

    let token = auth::create_token(&state.jwt, &user)?;
    info!("User {} updated their profile", user.user_id);

    Ok(Json(json!({ "user": user.account(), "token": token })))
}

fn validate_username(raw: &str) -> Result<String, ApiError> {
    let username = raw.trim();
    let chars = username.chars().count();

    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&chars) {
        return Err(ApiError::Validation(format!(
            "username must be {MIN_USERNAME_CHARS} to {MAX_USERNAME_CHARS} characters"
        )));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ApiError::Validation(
            "username may only contain letters, digits and underscores".into(),
        ));
    }

    Ok(username.to_string())
}

fn validate_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim();

    let well_formed = email.len() <= MAX_EMAIL_BYTES
        && !email.chars().any(char::is_whitespace)
        && matches!(
            email.split_once('@'),
            Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        );

    if !well_formed {
        return Err(ApiError::Validation("email address is not valid".into()));
    }

    Ok(email.to_string())
}

fn validate_password(raw: &str) -> Result<(), ApiError> {
    if raw.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::Validation(format!(
            "password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    if raw.len() > MAX_PASSWORD_BYTES {
        return Err(ApiError::Validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }

    Ok(())
}

fn validate_bio(raw: &str) -> Result<String, ApiError> {
    let bio = raw.trim();

    if bio.chars().count() > MAX_BIO_CHARS {
        return Err(ApiError::Validation(format!(
            "bio must be at most {MAX_BIO_CHARS} characters"
        )));
    }

    Ok(bio.to_string())
}
