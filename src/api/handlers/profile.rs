//! One-time profile setup and handle availability checks.
//!
//! Setup assigns the handle and nickname exactly once: the update only
//! matches rows whose handle is still unset, so a completed profile can
//! never be re-pointed at a different handle through this flow.

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use super::auth::principal::require_auth;
use super::auth::storage::{handle_available, set_profile, ProfileSetupOutcome};
use super::auth::{normalize_handle, valid_handle, NICKNAME_MIN_LEN};
use crate::api::error::ApiError;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileSetupRequest {
    pub handle: String,
    pub nickname: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ProfileSetupResponse {
    pub id: String,
    pub handle: String,
    pub nickname: String,
}

#[derive(Deserialize, Debug)]
pub struct CheckHandleParams {
    pub handle: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CheckHandleResponse {
    pub available: bool,
}

fn validate_setup(request: &ProfileSetupRequest) -> Result<(), ApiError> {
    if request.handle.trim().is_empty() || request.nickname.trim().is_empty() {
        return Err(ApiError::Validation(
            "Handle and nickname are required".to_string(),
        ));
    }

    if !request.handle.trim().starts_with('@') {
        return Err(ApiError::Validation(
            "Handle must start with @".to_string(),
        ));
    }

    if !valid_handle(&normalize_handle(&request.handle)) {
        return Err(ApiError::Validation(
            "Handle must be at least 4 characters and contain only letters, numbers, and underscores"
                .to_string(),
        ));
    }

    if request.nickname.trim().chars().count() < NICKNAME_MIN_LEN {
        return Err(ApiError::Validation(
            "Nickname must be at least 2 characters".to_string(),
        ));
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/profile/setup",
    request_body = ProfileSetupRequest,
    responses(
        (status = 200, description = "Profile completed", body = ProfileSetupResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Not logged in", body = String),
        (status = 409, description = "Handle taken or profile already completed", body = String)
    ),
    tag = "profile"
)]
pub async fn setup_profile(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    payload: Option<Json<ProfileSetupRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let principal = require_auth(&headers, &pool).await?;

    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };
    validate_setup(&request)?;

    let handle = normalize_handle(&request.handle);
    let nickname = request.nickname.trim().to_string();

    match set_profile(&pool, principal.user_id, &handle, &nickname).await? {
        ProfileSetupOutcome::Updated => Ok(Json(ProfileSetupResponse {
            id: principal.user_id.to_string(),
            handle,
            nickname,
        })),
        ProfileSetupOutcome::HandleTaken => {
            Err(ApiError::Conflict("Handle is already taken".to_string()))
        }
        ProfileSetupOutcome::AlreadyCompleted => Err(ApiError::Conflict(
            "Profile setup has already been completed".to_string(),
        )),
        ProfileSetupOutcome::NotFound => Err(ApiError::NotFound("User")),
    }
}

#[utoipa::path(
    get,
    path = "/profile/check-handle",
    params(
        ("handle" = String, Query, description = "Handle to check, with or without the @ marker")
    ),
    responses(
        (status = 200, description = "Availability", body = CheckHandleResponse),
        (status = 400, description = "Missing handle parameter", body = String)
    ),
    tag = "profile"
)]
pub async fn check_handle(
    pool: Extension<PgPool>,
    Query(params): Query<CheckHandleParams>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(handle) = params.handle.filter(|h| !h.trim().is_empty()) else {
        return Err(ApiError::Validation("Handle is required".to_string()));
    };

    let available = handle_available(&pool, &normalize_handle(&handle)).await?;
    Ok(Json(CheckHandleResponse { available }))
}
