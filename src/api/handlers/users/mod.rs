//! Public user pages and follow/unfollow actions.

pub(crate) mod storage;
pub(crate) mod types;

use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;

use self::types::{FollowResponse, UserProfileResponse, UserSummary};
use super::auth::normalize_handle;
use super::auth::principal::require_auth;
use super::auth::session::authenticate_session;
use super::auth::storage::{lookup_user_by_handle, UserRecord};
use super::posts;
use crate::api::error::ApiError;

/// Resolve a path handle to a user with a completed profile.
async fn resolve_user(pool: &PgPool, handle: &str) -> Result<UserRecord, ApiError> {
    let normalized = normalize_handle(handle);
    lookup_user_by_handle(pool, &normalized)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

#[utoipa::path(
    get,
    path = "/users/{handle}",
    params(
        ("handle" = String, Path, description = "User handle, with or without the @ marker")
    ),
    responses(
        (status = 200, description = "Profile with counts and posts", body = UserProfileResponse),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "users"
)]
pub async fn user_profile(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user = resolve_user(&pool, &handle).await?;

    let posts = posts::storage::list_by_user(&pool, user.user_id).await?;
    let follower_count = storage::follower_count(&pool, user.user_id).await?;
    let following_count = storage::following_count(&pool, user.user_id).await?;
    let post_count = i64::try_from(posts.len()).unwrap_or(i64::MAX);

    // Follow state is an enrichment for logged-in viewers; a failed session
    // lookup must not take the public page down with it.
    let viewer = authenticate_session(&headers, &pool).await.unwrap_or(None);
    let viewer_following = match viewer {
        Some(viewer) if viewer.user_id != user.user_id => {
            Some(storage::is_following(&pool, viewer.user_id, user.user_id).await?)
        }
        _ => None,
    };

    let response = UserProfileResponse {
        user: UserSummary {
            id: user.user_id,
            handle: user.handle.unwrap_or_default(),
            nickname: user.nickname.unwrap_or_default(),
            avatar_url: user.avatar_url,
            follower_count,
            following_count,
            post_count,
        },
        viewer_following,
        posts,
    };
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/users/{handle}/follow",
    params(
        ("handle" = String, Path, description = "Handle of the user to follow")
    ),
    responses(
        (status = 200, description = "Edge ensured", body = FollowResponse),
        (status = 400, description = "Self-follow", body = String),
        (status = 401, description = "Not logged in", body = String),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "users"
)]
pub async fn follow_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool).await?;
    let target = resolve_user(&pool, &handle).await?;

    if target.user_id == principal.user_id {
        return Err(ApiError::Validation("Cannot follow yourself".to_string()));
    }

    storage::follow(&pool, principal.user_id, target.user_id).await?;
    let follower_count = storage::follower_count(&pool, target.user_id).await?;

    Ok(Json(FollowResponse { follower_count }))
}

#[utoipa::path(
    delete,
    path = "/users/{handle}/follow",
    params(
        ("handle" = String, Path, description = "Handle of the user to unfollow")
    ),
    responses(
        (status = 200, description = "Edge removed if present", body = FollowResponse),
        (status = 401, description = "Not logged in", body = String),
        (status = 404, description = "No such user", body = String)
    ),
    tag = "users"
)]
pub async fn unfollow_user(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    Path(handle): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool).await?;
    let target = resolve_user(&pool, &handle).await?;

    storage::unfollow(&pool, principal.user_id, target.user_id).await?;
    let follower_count = storage::follower_count(&pool, target.user_id).await?;

    Ok(Json(FollowResponse { follower_count }))
}
