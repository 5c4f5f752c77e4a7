use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::state::{AppState, JwtConfig};
use crate::user::User;

/// How long an issued token stays valid
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT payload. The signed token carries the user's id, username and email,
/// so a profile edit reissues the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    pub username: String,
    pub email: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User) -> Self {
        let now = Utc::now();
        Self {
            sub: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

/// Sign a fresh token for the given user
pub fn create_token(config: &JwtConfig, user: &User) -> color_eyre::Result<String> {
    let claims = Claims::for_user(user);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(token)
}

/// Check a token's signature and expiry and return its claims
pub fn verify_token(config: &JwtConfig, token: &str) -> jsonwebtoken::errors::Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(data.claims)
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Extract the current user from the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".into()))?;

        let token = bearer_token(header_value)
            .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".into()))?;

        let claims = verify_token(&state.jwt, token).map_err(|err| {
            info!("Rejected token: {}", err);
            ApiError::Unauthorized("invalid or expired token".into())
        })?;

        // The token can outlive its account; check the row still exists
        let user = User::get_by_id(&state.db, claims.sub)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("unknown user".into()))?;

        Ok(AuthUser { user, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "an-hs256-secret-that-is-long-enough!".to_string(),
        }
    }

    fn test_user() -> User {
        User {
            user_id: Uuid::new_v4(),
            username: "wren".to_string(),
            email: "wren@example.com".to_string(),
            password_hash: "$2b$12$abcdefghijklmnopqrstuv".to_string(),
            bio: None,
            created_at_utc: Utc::now(),
            updated_at_utc: Utc::now(),
        }
    }

    #[test]
    fn token_round_trips_its_claims() {
        let config = test_config();
        let user = test_user();

        let token = create_token(&config, &user).unwrap();
        let claims = verify_token(&config, &token).unwrap();

        assert_eq!(claims.sub, user.user_id);
        assert_eq!(claims.username, user.username);
        assert_eq!(claims.email, user.email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let user = test_user();
        let token = create_token(&test_config(), &user).unwrap();

        let other = JwtConfig {
            secret: "a-different-secret-also-long-enough!".to_string(),
        };
        assert!(verify_token(&other, &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let user = test_user();

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.user_id,
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now - 7200,
            // Well past the default decode leeway
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&config, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token(&test_config(), "not.a.jwt").is_err());
    }

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer   spaced  "), Some("spaced"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("abc.def.ghi"), None);
    }

    #[test]
    fn auth_failures_map_to_401() {
        let err = ApiError::Unauthorized("invalid or expired token".into());
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
