use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error type shared by every request handler. Each variant pins the HTTP
/// status the client sees; the JSON body carries the message. Anything
/// unexpected lands in `Internal`, which logs the full report and returns
/// an opaque 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("internal server error")]
    Internal(color_eyre::Report),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref report) = self {
            tracing::error!(error = ?report, "Request Error");
        }

        let status = self.status();
        let body = Json(json!({
            "error": {
                "status": status.as_u16(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<color_eyre::Report> for ApiError {
    fn from(err: color_eyre::Report) -> Self {
        ApiError::Internal(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::Internal(err.into())
    }
}

/// Postgres error code for unique-constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

/// Map a unique-constraint violation to a 409 with the given message,
/// anything else to a 500.
pub(crate) fn on_conflict(message: &str) -> impl Fn(sqlx::Error) -> ApiError + '_ {
    move |err| {
        if is_unique_violation(&err) {
            ApiError::Conflict(message.to_string())
        } else {
            err.into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use color_eyre::eyre::eyre;

    #[test]
    fn statuses_match_variants() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Forbidden("x".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ApiError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Validation("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Internal(eyre!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = ApiError::Internal(eyre!("connection string was postgres://secret"));
        assert_eq!(err.to_string(), "internal server error");
    }

    #[tokio::test]
    async fn response_body_carries_status_and_message() {
        use http_body_util::BodyExt as _;

        let response = ApiError::NotFound("post not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["status"], 404);
        assert_eq!(body["error"]["message"], "post not found");
    }
}
