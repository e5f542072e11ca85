//! Request/response types and excerpt derivation for posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub(crate) const TITLE_MIN_LEN: usize = 3;
pub(crate) const TITLE_MAX_LEN: usize = 200;
pub(crate) const CONTENT_MIN_LEN: usize = 10;
pub(crate) const CONTENT_MAX_LEN: usize = 50_000;
const EXCERPT_LEN: usize = 150;
const EXCERPT_MARKER: &str = "...";

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// A published post. `handle`/`nickname` are the author's values at the
/// time of writing: a historical snapshot, not a live join.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub user_id: Uuid,
    pub handle: String,
    pub nickname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostsResponse {
    pub posts: Vec<PostResponse>,
}

/// First 150 code points of the body, with a truncation marker when the
/// body is longer.
pub(crate) fn excerpt(content: &str) -> String {
    let mut out: String = content.chars().take(EXCERPT_LEN).collect();
    if content.chars().nth(EXCERPT_LEN).is_some() {
        out.push_str(EXCERPT_MARKER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_content_is_its_own_excerpt() {
        assert_eq!(excerpt("hello world"), "hello world");
    }

    #[test]
    fn content_at_exactly_150_is_unchanged() {
        let content = "a".repeat(150);
        assert_eq!(excerpt(&content), content);
    }

    #[test]
    fn content_of_151_gets_truncated_with_marker() {
        let content = "a".repeat(151);
        let result = excerpt(&content);
        assert_eq!(result.chars().count(), 153);
        assert!(result.ends_with("..."));
        assert!(result.starts_with(&"a".repeat(150)));
    }

    #[test]
    fn excerpt_counts_code_points_not_bytes() {
        let content = "ü".repeat(151);
        let result = excerpt(&content);
        assert!(result.ends_with("..."));
        assert_eq!(result.chars().count(), 153);
    }

    #[test]
    fn create_post_request_round_trips() {
        let request = CreatePostRequest {
            title: "First post".to_string(),
            content: "Some long enough content".to_string(),
        };
        let value = serde_json::to_value(&request).expect("serialize");
        let decoded: CreatePostRequest = serde_json::from_value(value).expect("deserialize");
        assert_eq!(decoded.title, "First post");
    }
}
