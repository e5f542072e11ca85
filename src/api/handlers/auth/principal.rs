//! Authenticated principal extraction and authorization helpers.
//!
//! Flow Overview: read the session cookie, resolve it to a user, and return
//! a principal that downstream handlers can use. Profile fields are carried
//! along so handlers can gate on setup completion without another lookup.

use axum::http::{HeaderMap, StatusCode};
use sqlx::PgPool;

use super::session::authenticate_session;

/// Authenticated user context derived from the session cookie.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: uuid::Uuid,
    pub email: String,
    pub display_name: String,
    pub handle: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
}

impl Principal {
    /// Handle and nickname, present only once profile setup has completed.
    pub(crate) fn profile(&self) -> Option<(&str, &str)> {
        match (self.handle.as_deref(), self.nickname.as_deref()) {
            (Some(handle), Some(nickname)) => Some((handle, nickname)),
            _ => None,
        }
    }
}

/// Resolve a session cookie into a principal, or return 401 for missing sessions.
pub async fn require_auth(headers: &HeaderMap, pool: &PgPool) -> Result<Principal, StatusCode> {
    match authenticate_session(headers, pool).await {
        Ok(Some(record)) => Ok(Principal {
            user_id: record.user_id,
            email: record.email,
            display_name: record.display_name,
            handle: record.handle,
            nickname: record.nickname,
            avatar_url: record.avatar_url,
        }),
        Ok(None) => Err(StatusCode::UNAUTHORIZED),
        Err(status) => Err(status),
    }
}
