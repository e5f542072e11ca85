//! Request/response types for auth endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub handle: String,
    pub nickname: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
    pub handle: String,
    pub nickname: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

/// Minimal identity payload returned on successful login, enough for the
/// caller to materialize a session.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct IdentityResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct FederatedSignInRequest {
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Session view of the current user. `handle`/`nickname` are re-resolved on
/// every call so clients see profile-setup completion without re-login.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
    pub handle: Option<String>,
    pub nickname: Option<String>,
    pub avatar_url: Option<String>,
    pub profile_complete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, Result};

    #[test]
    fn register_request_round_trips() -> Result<()> {
        let request = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "Valid1Password".to_string(),
            handle: "@alice".to_string(),
            nickname: "Alice".to_string(),
        };
        let value = serde_json::to_value(&request)?;
        let email = value
            .get("email")
            .and_then(serde_json::Value::as_str)
            .context("missing email")?;
        assert_eq!(email, "alice@example.com");
        let decoded: RegisterRequest = serde_json::from_value(value)?;
        assert_eq!(decoded.handle, "@alice");
        Ok(())
    }

    #[test]
    fn session_response_round_trips() -> Result<()> {
        let response = SessionResponse {
            user_id: "00000000-0000-0000-0000-000000000000".to_string(),
            email: "bob@example.com".to_string(),
            display_name: "Bob".to_string(),
            handle: None,
            nickname: None,
            avatar_url: None,
            profile_complete: false,
        };
        let value = serde_json::to_value(&response)?;
        let decoded: SessionResponse = serde_json::from_value(value)?;
        assert!(!decoded.profile_complete);
        assert!(decoded.handle.is_none());
        Ok(())
    }
}
