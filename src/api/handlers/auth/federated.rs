//! Federated sign-in callback.
//!
//! The identity-provider integration itself is an external collaborator:
//! token exchange and signature verification happen in the provider bridge,
//! which then calls this endpoint with the verified identity. The call must
//! present the shared provider secret; without it the assertion is ignored.
//!
//! First sign-in for an unknown email creates the user with no handle or
//! nickname; profile setup is a separate, one-time step.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use secrecy::ExposeSecret;
use serde_json::json;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use super::{
    audit::{AuditEvent, AuditEventKind},
    session::{session_cookie, session_response},
    state::AuthState,
    storage::{
        insert_session, insert_user, lookup_user_by_email, InsertUserOutcome, SessionRecord,
        UserRecord,
    },
    types::{FederatedSignInRequest, SessionResponse},
    utils::{client_addr, normalize_email, valid_email},
};
use crate::cli::globals::GlobalArgs;

const PROVIDER_SECRET_HEADER: &str = "x-provider-secret";
const DEFAULT_DISPLAY_NAME: &str = "User";

/// Compare the presented secret against the configured one without exposing
/// the comparison to byte-position timing.
fn provider_secret_matches(presented: &str, configured: &str) -> bool {
    if configured.is_empty() {
        return false;
    }
    let presented = Sha256::digest(presented.as_bytes());
    let configured = Sha256::digest(configured.as_bytes());
    presented == configured
}

#[utoipa::path(
    post,
    path = "/auth/federated",
    request_body = FederatedSignInRequest,
    params(
        ("x-provider-secret" = String, Header, description = "Shared identity-provider secret")
    ),
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Unauthorized", body = String),
        (status = 503, description = "Federated sign-in not configured", body = String)
    ),
    tag = "auth"
)]
pub async fn federated_sign_in(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    globals: Extension<GlobalArgs>,
    payload: Option<Json<FederatedSignInRequest>>,
) -> impl IntoResponse {
    let configured = globals.provider_client_secret.expose_secret();
    if configured.is_empty() {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            "Federated sign-in not configured".to_string(),
        )
            .into_response();
    }

    let presented = headers
        .get(PROVIDER_SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    if !provider_secret_matches(presented, configured) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()).into_response();
    }

    let request: FederatedSignInRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let user = match resolve_or_create_user(&pool, &email, &request).await {
        Ok(user) => user,
        Err(err) => {
            error!("Federated sign-in failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sign-in failed".to_string(),
            )
                .into_response();
        }
    };

    let client = client_addr(&headers);
    let mut event = AuditEvent::new(AuditEventKind::Login, client, true)
        .with_user_id(user.user_id)
        .with_email(user.email.clone())
        .with_metadata(json!({ "method": "federated" }));
    if let Some(handle) = user.handle.clone() {
        event = event.with_handle(handle);
    }
    auth_state.audit().append(event);

    let token = match insert_session(
        &pool,
        user.user_id,
        auth_state.config().session_ttl_seconds(),
    )
    .await
    {
        Ok(token) => token,
        Err(err) => {
            error!("Failed to insert session: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sign-in failed".to_string(),
            )
                .into_response();
        }
    };

    let mut response_headers = HeaderMap::new();
    match session_cookie(auth_state.config(), &token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            error!("Failed to build session cookie: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sign-in failed".to_string(),
            )
                .into_response();
        }
    }

    // Return the session view so the bridge can redirect pending-setup
    // accounts straight to profile setup.
    let body = session_response(SessionRecord {
        user_id: user.user_id,
        email: user.email,
        display_name: user.display_name,
        handle: user.handle,
        nickname: user.nickname,
        avatar_url: user.avatar_url,
    });
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

/// Find the user for a verified federated identity, creating one with an
/// empty profile on first sign-in.
async fn resolve_or_create_user(
    pool: &PgPool,
    email: &str,
    request: &FederatedSignInRequest,
) -> anyhow::Result<UserRecord> {
    if let Some(user) = lookup_user_by_email(pool, email).await? {
        return Ok(user);
    }

    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME);

    match insert_user(
        pool,
        email,
        display_name,
        None,
        None,
        request.avatar_url.as_deref(),
        None,
    )
    .await?
    {
        InsertUserOutcome::Created(user) => Ok(user),
        // Lost a race with a concurrent first sign-in; the row exists now.
        InsertUserOutcome::DuplicateEmail | InsertUserOutcome::HandleTaken => {
            lookup_user_by_email(pool, email)
                .await?
                .ok_or_else(|| anyhow::anyhow!("user vanished after duplicate-email conflict"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_must_match() {
        assert!(provider_secret_matches("s3cret", "s3cret"));
        assert!(!provider_secret_matches("wrong", "s3cret"));
    }

    #[test]
    fn empty_configured_secret_never_matches() {
        assert!(!provider_secret_matches("", ""));
        assert!(!provider_secret_matches("anything", ""));
    }
}
