//! Post endpoints: public listing and authenticated creation.

pub(crate) mod storage;
pub(crate) mod types;

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use uuid::Uuid;

use self::types::{
    CreatePostRequest, PostResponse, PostsResponse, CONTENT_MAX_LEN, CONTENT_MIN_LEN,
    TITLE_MAX_LEN, TITLE_MIN_LEN,
};
use super::auth::principal::require_auth;
use crate::api::error::ApiError;

/// Strip null bytes and surrounding whitespace before validation.
fn sanitize(input: &str) -> String {
    input.trim().replace('\0', "")
}

fn validate_post(title: &str, content: &str) -> Result<(), ApiError> {
    let title_len = title.chars().count();
    if title_len < TITLE_MIN_LEN {
        return Err(ApiError::Validation(
            "Title must be at least 3 characters long".to_string(),
        ));
    }
    if title_len > TITLE_MAX_LEN {
        return Err(ApiError::Validation(
            "Title must not exceed 200 characters".to_string(),
        ));
    }

    let content_len = content.chars().count();
    if content_len < CONTENT_MIN_LEN {
        return Err(ApiError::Validation(
            "Content must be at least 10 characters long".to_string(),
        ));
    }
    if content_len > CONTENT_MAX_LEN {
        return Err(ApiError::Validation(
            "Content must not exceed 50,000 characters".to_string(),
        ));
    }

    Ok(())
}

#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = PostsResponse)
    ),
    tag = "posts"
)]
pub async fn list_posts(pool: Extension<PgPool>) -> Result<impl IntoResponse, ApiError> {
    let posts = storage::list_all(&pool).await?;
    Ok(Json(PostsResponse { posts }))
}

#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Not logged in", body = String),
        (status = 403, description = "Profile setup incomplete", body = String)
    ),
    tag = "posts"
)]
pub async fn create_post(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<CreatePostRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool).await?;

    // Posting requires a completed profile; the distinct message lets the
    // client redirect to setup instead of showing a generic error.
    let Some((handle, nickname)) = principal.profile() else {
        return Err(ApiError::Forbidden(
            "Please complete your profile setup before creating posts".to_string(),
        ));
    };

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    let title = sanitize(&request.title);
    let content = sanitize(&request.content);
    validate_post(&title, &content)?;

    let post = storage::insert_post(
        &pool,
        principal.user_id,
        handle,
        nickname,
        &title,
        &content,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(
        ("id" = String, Path, description = "Post id (UUID)")
    ),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 400, description = "Malformed post id", body = String),
        (status = 404, description = "No such post", body = String)
    ),
    tag = "posts"
)]
pub async fn get_post(
    pool: Extension<PgPool>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    // Ids must be canonical UUIDs; anything else is a bad request, not a miss.
    let post_id = Uuid::parse_str(id.trim())
        .map_err(|_| ApiError::Validation("Invalid post id format".to_string()))?;

    match storage::get_by_id(&pool, post_id).await? {
        Some(post) => Ok(Json(post)),
        None => Err(ApiError::NotFound("Post")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_nulls_and_whitespace() {
        assert_eq!(sanitize("  hello\0world  "), "helloworld");
    }

    #[test]
    fn title_bounds_enforced() {
        assert!(validate_post("ab", "long enough content").is_err());
        assert!(validate_post(&"t".repeat(201), "long enough content").is_err());
        assert!(validate_post("abc", "long enough content").is_ok());
    }

    #[test]
    fn content_bounds_enforced() {
        assert!(validate_post("Title", "short").is_err());
        assert!(validate_post("Title", &"c".repeat(50_001)).is_err());
        assert!(validate_post("Title", &"c".repeat(50_000)).is_ok());
    }
}
