use axum::routing::{delete, get, post, put};

use crate::errors::ApiError;
use crate::state::AppState;

pub mod comments;
pub mod posts;
pub mod users;

/// Build the application router with all routes
pub fn routes(app_state: AppState) -> axum::Router {
    axum::Router::new()
        // Account and token lifecycle
        .route("/api/auth/register", post(users::register))
        .route("/api/auth/login", post(users::login))
        .route("/api/auth/verify", get(users::verify))
        // Profiles
        .route("/api/users/me", put(users::update_profile))
        .route("/api/users/:username", get(users::profile))
        // Posts and the feed
        .route("/api/feed", get(posts::feed))
        .route("/api/posts", post(posts::create))
        .route("/api/posts/:post_id", delete(posts::delete))
        // Comments
        .route("/api/posts/:post_id/comments", post(comments::create))
        .route("/api/comments/:comment_id", delete(comments::delete))
        // Add trace layer for debugging
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Trim user-supplied text and enforce a character budget. Used for post
/// and comment bodies.
pub(crate) fn validated_content(
    raw: &str,
    max_chars: usize,
    what: &str,
) -> Result<String, ApiError> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return Err(ApiError::Validation(format!("{what} content is empty")));
    }

    if trimmed.chars().count() > max_chars {
        return Err(ApiError::Validation(format!(
            "{what} content is over {max_chars} characters"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_is_trimmed() {
        assert_eq!(
            validated_content("  chirp  ", 100, "post").unwrap(),
            "chirp"
        );
    }

    #[test]
    fn empty_and_whitespace_content_is_rejected() {
        assert!(validated_content("", 100, "post").is_err());
        assert!(validated_content("   \n\t ", 100, "post").is_err());
    }

    #[test]
    fn budget_counts_characters_not_bytes() {
        // Four characters, more than four bytes
        assert!(validated_content("🐦🐦🐦🐦", 4, "post").is_ok());
        assert!(validated_content("🐦🐦🐦🐦🐦", 4, "post").is_err());
    }
}
