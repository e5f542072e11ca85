//! Credentials registration.
//!
//! Shape validation happens before storage is touched. Duplicate email and
//! taken handle come back as distinct conflicts: registration inherently
//! reveals existence, so there is nothing to hide here, unlike login.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use super::{
    audit::{AuditEvent, AuditEventKind},
    state::AuthState,
    storage::{insert_user, InsertUserOutcome},
    types::{RegisterRequest, RegisterResponse},
    utils::{
        client_addr, hash_password, normalize_email, normalize_handle, password_policy_error,
        valid_email, valid_handle, NICKNAME_MIN_LEN,
    },
};
use crate::api::handlers::auth::rate_limit::RateLimitDecision;

const REGISTER_RATE_LIMIT: u32 = 5;
const REGISTER_RATE_WINDOW: Duration = Duration::from_secs(60 * 60);

/// Validate the request shape; returns the user-facing message for the
/// first rule the input breaks.
pub(super) fn validate_registration(request: &RegisterRequest) -> Option<String> {
    if request.email.trim().is_empty()
        || request.password.is_empty()
        || request.handle.trim().is_empty()
        || request.nickname.trim().is_empty()
    {
        return Some("All fields are required".to_string());
    }

    if !valid_email(&normalize_email(&request.email)) {
        return Some("Invalid email format".to_string());
    }

    if let Some(message) = password_policy_error(&request.password) {
        return Some(message.to_string());
    }

    if !request.handle.trim().starts_with('@') {
        return Some("Handle must start with @".to_string());
    }

    if !valid_handle(&normalize_handle(&request.handle)) {
        return Some(
            "Handle must be at least 4 characters and contain only letters, numbers, and underscores"
                .to_string(),
        );
    }

    if request.nickname.trim().chars().count() < NICKNAME_MIN_LEN {
        return Some("Nickname must be at least 2 characters".to_string());
    }

    None
}

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = RegisterResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email or handle already in use", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let client = client_addr(&headers);

    // Independent counter namespace from login.
    let key = format!("register:{client}");
    if auth_state
        .rate_limiter()
        .check(&key, REGISTER_RATE_LIMIT, REGISTER_RATE_WINDOW)
        == RateLimitDecision::Limited
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many registration attempts. Please try again later.".to_string(),
        )
            .into_response();
    }

    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    if let Some(message) = validate_registration(&request) {
        return (StatusCode::BAD_REQUEST, message).into_response();
    }

    let email = normalize_email(&request.email);
    let handle = normalize_handle(&request.handle);
    let nickname = request.nickname.trim().to_string();

    let password_hash = match hash_password(&request.password) {
        Ok(hash) => hash,
        Err(err) => {
            error!("Failed to hash password: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    // The unique constraints classify the conflict; no pre-read races.
    let outcome = insert_user(
        &pool,
        &email,
        &nickname,
        Some(&handle),
        Some(&nickname),
        None,
        Some(&password_hash),
    )
    .await;

    let user = match outcome {
        Ok(InsertUserOutcome::Created(user)) => user,
        Ok(InsertUserOutcome::DuplicateEmail) => {
            return (
                StatusCode::CONFLICT,
                "Email address is already in use".to_string(),
            )
                .into_response();
        }
        Ok(InsertUserOutcome::HandleTaken) => {
            return (
                StatusCode::CONFLICT,
                "Handle is already taken".to_string(),
            )
                .into_response();
        }
        Err(err) => {
            error!("Failed to insert user: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Registration failed".to_string(),
            )
                .into_response();
        }
    };

    auth_state.audit().append(
        AuditEvent::new(AuditEventKind::Register, client, true)
            .with_user_id(user.user_id)
            .with_handle(handle.clone())
            .with_email(user.email.clone()),
    );

    let body = RegisterResponse {
        id: user.user_id.to_string(),
        email: user.email,
        handle,
        nickname,
    };
    (StatusCode::CREATED, Json(body)).into_response()
}
