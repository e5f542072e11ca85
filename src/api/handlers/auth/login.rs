//! Credentials login: the security pipeline in front of session issuance.
//!
//! Flow Overview:
//! 1) Lockout check for the attempted handle.
//! 2) Fixed-window rate limit per client address (`login:` namespace).
//! 3) User lookup and argon2 verification.
//! 4) Lockout bookkeeping and audit append on every outcome.
//! 5) Session issuance on success.
//!
//! Every failure returns the same generic body: callers cannot tell a wrong
//! password from an unknown handle or an active lock. The audit log keeps
//! the distinguishing reason internally.

use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::error;

use super::{
    audit::{AuditEvent, AuditEventKind},
    session::session_cookie,
    state::AuthState,
    storage::{insert_session, lookup_user_by_handle, Credential},
    types::{IdentityResponse, LoginRequest},
    utils::{client_addr, normalize_handle, verify_password},
};
use crate::api::handlers::auth::rate_limit::RateLimitDecision;

const LOGIN_RATE_LIMIT: u32 = 10;
const LOGIN_RATE_WINDOW: Duration = Duration::from_secs(15 * 60);
// One body for every auth failure; reasons live in the audit log only.
const GENERIC_FAILURE: &str = "Invalid credentials";

/// Why an attempt was rejected before credentials were even considered.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum LoginBlock {
    Locked,
    RateLimited,
}

/// Pre-credential checks: lockout, then rate limit. Appends the matching
/// audit event when blocking.
pub(super) fn guard_login_attempt(
    auth: &AuthState,
    identifier: &str,
    client: &str,
) -> Result<(), LoginBlock> {
    let status = auth.lockout().is_account_locked(identifier);
    if status.locked {
        auth.audit().append(
            AuditEvent::new(AuditEventKind::AccountLocked, client, false)
                .with_handle(identifier)
                .with_metadata(json!({ "remaining_seconds": status.remaining_seconds })),
        );
        return Err(LoginBlock::Locked);
    }

    let key = format!("login:{client}");
    if auth
        .rate_limiter()
        .check(&key, LOGIN_RATE_LIMIT, LOGIN_RATE_WINDOW)
        == RateLimitDecision::Limited
    {
        auth.audit().append(
            AuditEvent::new(AuditEventKind::FailedLogin, client, false)
                .with_handle(identifier)
                .with_metadata(json!({ "reason": "rate_limited" })),
        );
        return Err(LoginBlock::RateLimited);
    }

    Ok(())
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = IdentityResponse),
        (status = 401, description = "Invalid credentials", body = String),
        (status = 429, description = "Rate limited", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    headers: HeaderMap,
    pool: Extension<PgPool>,
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let identifier = normalize_handle(&request.handle);
    let client = client_addr(&headers);

    match guard_login_attempt(&auth_state, &identifier, &client) {
        Ok(()) => {}
        Err(LoginBlock::Locked) => {
            return (StatusCode::UNAUTHORIZED, GENERIC_FAILURE.to_string()).into_response();
        }
        Err(LoginBlock::RateLimited) => {
            return (StatusCode::TOO_MANY_REQUESTS, "Rate limited".to_string()).into_response();
        }
    }

    let user = match lookup_user_by_handle(&pool, &identifier).await {
        Ok(user) => user,
        Err(err) => {
            error!("Login lookup failed: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Login failed".to_string(),
            )
                .into_response();
        }
    };

    // Unknown handles and federation-only accounts take the same path:
    // both consume lockout budget and both answer with the generic body.
    let Some((user, stored_hash)) = user.and_then(|record| match record.credential {
        Credential::PasswordHash(ref hash) => {
            let hash = hash.clone();
            Some((record, hash))
        }
        Credential::None => None,
    }) else {
        auth_state.lockout().record_failed_login(&identifier);
        auth_state.audit().append(
            AuditEvent::new(AuditEventKind::FailedLogin, client, false)
                .with_handle(identifier.as_str())
                .with_metadata(json!({ "reason": "user_not_found" })),
        );
        return (StatusCode::UNAUTHORIZED, GENERIC_FAILURE.to_string()).into_response();
    };

    if !verify_password(&request.password, &stored_hash) {
        let now_locked = auth_state.lockout().record_failed_login(&identifier);
        let kind = if now_locked {
            AuditEventKind::AccountLocked
        } else {
            AuditEventKind::FailedLogin
        };
        let mut event = AuditEvent::new(kind, client, false)
            .with_user_id(user.user_id)
            .with_email(user.email)
            .with_metadata(json!({ "reason": "invalid_password" }));
        if let Some(handle) = user.handle {
            event = event.with_handle(handle);
        }
        auth_state.audit().append(event);
        return (StatusCode::UNAUTHORIZED, GENERIC_FAILURE.to_string()).into_response();
    }

    // Success: clear the failure count before issuing the session.
    auth_state.lockout().reset_failed_logins(&identifier);
    let mut event = AuditEvent::new(AuditEventKind::Login, client, true)
        .with_user_id(user.user_id)
        .with_email(user.email.clone());
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
                "Login failed".to_string(),
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
                "Login failed".to_string(),
            )
                .into_response();
        }
    }

    let body = IdentityResponse {
        id: user.user_id.to_string(),
        email: user.email,
        display_name: user.display_name,
        avatar_url: user.avatar_url,
    };
    (StatusCode::OK, response_headers, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::super::audit::{AuditEventKind, AuditLog};
    use super::super::lockout::LockoutGuard;
    use super::super::rate_limit::{FixedWindowRateLimiter, NoopRateLimiter};
    use super::super::state::{AuthConfig, AuthState};
    use super::*;

    fn state_with(rate_limiter: Arc<dyn super::super::rate_limit::RateLimiter>) -> AuthState {
        AuthState::new(
            AuthConfig::new("https://quill.blog".to_string()),
            rate_limiter,
            LockoutGuard::new(),
            AuditLog::new(),
        )
    }

    #[test]
    fn clean_identifier_passes_the_guard() {
        let state = state_with(Arc::new(NoopRateLimiter));
        assert_eq!(guard_login_attempt(&state, "@alice", "1.2.3.4"), Ok(()));
        assert!(state.audit().recent(10).is_empty());
    }

    #[test]
    fn locked_identifier_is_blocked_and_audited() {
        let state = state_with(Arc::new(NoopRateLimiter));
        for _ in 0..5 {
            state.lockout().record_failed_login("@alice");
        }

        assert_eq!(
            guard_login_attempt(&state, "@alice", "1.2.3.4"),
            Err(LoginBlock::Locked)
        );
        let recent = state.audit().recent(1);
        assert_eq!(recent[0].event.kind, AuditEventKind::AccountLocked);
        assert!(!recent[0].event.success);
    }

    #[test]
    fn rate_limited_address_is_blocked_and_audited() {
        let state = state_with(Arc::new(FixedWindowRateLimiter::new()));
        for _ in 0..10 {
            assert_eq!(guard_login_attempt(&state, "@alice", "1.2.3.4"), Ok(()));
        }

        assert_eq!(
            guard_login_attempt(&state, "@alice", "1.2.3.4"),
            Err(LoginBlock::RateLimited)
        );
        let recent = state.audit().recent(1);
        assert_eq!(recent[0].event.kind, AuditEventKind::FailedLogin);
        assert_eq!(
            recent[0]
                .event
                .metadata
                .as_ref()
                .and_then(|m| m.get("reason"))
                .and_then(serde_json::Value::as_str),
            Some("rate_limited")
        );
    }

    #[test]
    fn rate_limit_is_per_client_address() {
        let state = state_with(Arc::new(FixedWindowRateLimiter::new()));
        for _ in 0..10 {
            guard_login_attempt(&state, "@alice", "1.2.3.4").expect("allowed");
        }
        assert_eq!(guard_login_attempt(&state, "@alice", "5.6.7.8"), Ok(()));
    }
}
