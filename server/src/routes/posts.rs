use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::{ApiError, ApiResult};
use crate::feed;
use crate::post::Post;
use crate::routes::validated_content;
use crate::state::AppState;

const MAX_POST_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct CreatePostParams {
    pub content: String,
}

pub async fn create(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Json(params): Json<CreatePostParams>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let content = validated_content(&params.content, MAX_POST_CHARS, "post")?;

    let post = Post::create(&state.db, user.user_id, &content).await?;
    info!("User {} created post {}", user.user_id, post.post_id);

    Ok((StatusCode::CREATED, Json(json!({ "post": post }))))
}

pub async fn delete(
    State(state): State<AppState>,
    AuthUser { user, .. }: AuthUser,
    Path(post_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let post = Post::get_by_id(&state.db, post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".into()))?;

    if post.user_id != user.user_id {
        return Err(ApiError::Forbidden(
            "only the author can delete a post".into(),
        ));
    }

    // Comments on the post go with it via the FK cascade
    post.delete(&state.db).await?;
    info!("User {} deleted post {}", user.user_id, post_id);

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Reverse-chronological listing of all posts with nested author and
/// comment data
pub async fn feed(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<FeedParams>,
) -> ApiResult<Json<Value>> {
    let (limit, offset) = feed::clamp_page(params.limit, params.offset);

    let posts = feed::assemble_feed(&state.db, limit, offset).await?;

    Ok(Json(json!({
        "feed": posts,
        "limit": limit,
        "offset": offset,
    })))
}
