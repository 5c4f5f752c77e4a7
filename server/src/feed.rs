use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgPool;
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// A post row joined to its author, as read from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRow {
    pub post_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
}

/// A comment row joined to its author, as read from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub comment_id: Uuid,
    pub post_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
    pub user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedAuthor {
    pub user_id: Uuid,
    pub username: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedComment {
    pub comment_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
    pub author: FeedAuthor,
}

/// One feed entry: the post with its author and its comments nested in
#[derive(Debug, Clone, Serialize)]
pub struct FeedPost {
    pub post_id: Uuid,
    pub content: String,
    pub created_at_utc: DateTime<Utc>,
    pub author: FeedAuthor,
    pub comments: Vec<FeedComment>,
}

impl CommentRow {
    fn into_feed_comment(self) -> FeedComment {
        FeedComment {
            comment_id: self.comment_id,
            content: self.content,
            created_at_utc: self.created_at_utc,
            author: FeedAuthor {
                user_id: self.user_id,
                username: self.username,
                bio: self.bio,
            },
        }
    }
}

/// Clamp the client-supplied page parameters to sane bounds
pub fn clamp_page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

/// Assemble one page of the feed: posts newest first, each with its author
/// and comments. Two queries total; the comments for the whole page come
/// back in one `ANY($1)` fetch instead of one round trip per post.
pub async fn assemble_feed(pool: &PgPool, limit: i64, offset: i64) -> sqlx::Result<Vec<FeedPost>> {
    let posts = sqlx::query_as::<_, PostRow>(
        "SELECT p.post_id, p.content, p.created_at_utc,
                u.user_id, u.username, u.bio
         FROM posts p
         JOIN users u ON u.user_id = p.user_id
         ORDER BY p.created_at_utc DESC, p.post_id DESC
         LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    if posts.is_empty() {
        return Ok(Vec::new());
    }

    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.post_id).collect();
    let comments = sqlx::query_as::<_, CommentRow>(
        "SELECT c.comment_id, c.post_id, c.content, c.created_at_utc,
                u.user_id, u.username, u.bio
         FROM comments c
         JOIN users u ON u.user_id = c.user_id
         WHERE c.post_id = ANY($1)
         ORDER BY c.created_at_utc ASC, c.comment_id ASC",
    )
    .bind(post_ids)
    .fetch_all(pool)
    .await?;

    Ok(nest(posts, comments))
}

/// Group comments under their posts, keeping the post ordering from the
/// first query and the comment ordering from the second
fn nest(posts: Vec<PostRow>, comments: Vec<CommentRow>) -> Vec<FeedPost> {
    let mut comments_by_post: HashMap<Uuid, Vec<FeedComment>> = HashMap::new();
    for comment in comments {
        comments_by_post
            .entry(comment.post_id)
            .or_default()
            .push(comment.into_feed_comment());
    }

    posts
        .into_iter()
        .map(|post| FeedPost {
            post_id: post.post_id,
            content: post.content,
            created_at_utc: post.created_at_utc,
            author: FeedAuthor {
                user_id: post.user_id,
                username: post.username,
                bio: post.bio,
            },
            comments: comments_by_post.remove(&post.post_id).unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_row(post_id: Uuid, username: &str) -> PostRow {
        PostRow {
            post_id,
            content: format!("post by {username}"),
            created_at_utc: Utc::now(),
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            bio: None,
        }
    }

    fn comment_row(post_id: Uuid, content: &str) -> CommentRow {
        CommentRow {
            comment_id: Uuid::new_v4(),
            post_id,
            content: content.to_string(),
            created_at_utc: Utc::now(),
            user_id: Uuid::new_v4(),
            username: "replier".to_string(),
            bio: Some("just here for the comments".to_string()),
        }
    }

    #[test]
    fn nest_groups_comments_under_their_posts() {
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let posts = vec![post_row(first, "finch"), post_row(second, "wren")];
        let comments = vec![
            comment_row(second, "nice"),
            comment_row(first, "first!"),
            comment_row(first, "second!"),
        ];

        let feed = nest(posts, comments);

        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].post_id, first);
        assert_eq!(feed[0].comments.len(), 2);
        assert_eq!(feed[0].comments[0].content, "first!");
        assert_eq!(feed[0].comments[1].content, "second!");
        assert_eq!(feed[1].comments.len(), 1);
        assert_eq!(feed[1].comments[0].content, "nice");
    }

    #[test]
    fn nest_keeps_post_order_and_tolerates_no_comments() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let posts = ids.iter().map(|id| post_row(*id, "finch")).collect();

        let feed = nest(posts, Vec::new());

        let feed_ids: Vec<Uuid> = feed.iter().map(|p| p.post_id).collect();
        assert_eq!(feed_ids, ids);
        assert!(feed.iter().all(|p| p.comments.is_empty()));
    }

    #[test]
    fn nested_payload_shape() {
        let post_id = Uuid::new_v4();
        let feed = nest(vec![post_row(post_id, "finch")], vec![comment_row(post_id, "hi")]);

        let value = serde_json::to_value(&feed).unwrap();
        assert_eq!(value[0]["author"]["username"], "finch");
        assert_eq!(value[0]["comments"][0]["content"], "hi");
        assert_eq!(value[0]["comments"][0]["author"]["username"], "replier");
    }

    #[test]
    fn page_params_are_clamped() {
        assert_eq!(clamp_page(None, None), (DEFAULT_PAGE_SIZE, 0));
        assert_eq!(clamp_page(Some(10), Some(20)), (10, 20));
        assert_eq!(clamp_page(Some(0), None), (1, 0));
        assert_eq!(clamp_page(Some(10_000), Some(-5)), (MAX_PAGE_SIZE, 0));
    }
}
