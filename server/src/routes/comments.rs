use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::comment::Comment;
use crate::errors::{ApiError, ApiResult};
use crate::post::Post;
use crate::routes::validated_content;
use crate::state::AppState;

const MAX_COMMENT_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
pub struct CreateCommentParams {
    pub content: String,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Path(post_id): Path<Uuid>,
    Json(params): Json<CreateCommentParams>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let content = validated_content(&params.content, MAX_COMMENT_CHARS, "comment")?;

    // Commenting on a post that no longer exists is a 404, not an FK error
    let post = Post::get_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;

    let comment = Comment::create(&state.db, post.post_id, user.user_id, &content).await?;
    info!(
        "User {} commented on post {}",
        user.user_id, post.post_id
    );

    Ok((StatusCode::CREATED, Json(json!({ "comment": comment }))))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Path(comment_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let comment = Comment::get_by_id(&state.db, comment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("comment not found".into()))?;

    if comment.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "only the author can delete a comment".into(),
        ));
    }

    comment.delete(&state.db).await?;
    info!("User {} deleted comment {}", user.user_id, comment_id);

    Ok(StatusCode::NO_CONTENT)
}
