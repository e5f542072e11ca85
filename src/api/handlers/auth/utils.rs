//! Small helpers for auth validation, session tokens, and client identity.

use anyhow::{Context, Result};
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use regex::Regex;
use sha2::{Digest, Sha256};

/// Handles start with this marker and must be at least this long overall.
pub(crate) const HANDLE_MARKER: char = '@';
pub(crate) const HANDLE_MIN_LEN: usize = 4;
pub(crate) const NICKNAME_MIN_LEN: usize = 2;
const PASSWORD_MIN_LEN: usize = 8;

/// Normalize a handle for lookup/uniqueness checks: trim, lowercase, and
/// accept the form without the marker (URLs carry `alice`, logins `@alice`).
pub(crate) fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim().to_lowercase();
    if trimmed.starts_with(HANDLE_MARKER) {
        trimmed
    } else {
        format!("{HANDLE_MARKER}{trimmed}")
    }
}

/// Check a normalized handle: marker-prefixed, at least four characters in
/// total, alphanumerics/underscore after the marker.
pub(crate) fn valid_handle(handle_normalized: &str) -> bool {
    Regex::new(r"^@[a-z0-9_]+$").is_ok_and(|regex| regex.is_match(handle_normalized))
        && handle_normalized.chars().count() >= HANDLE_MIN_LEN
}

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Password policy check; returns the user-facing rejection message when the
/// password falls short.
pub(crate) fn password_policy_error(password: &str) -> Option<&'static str> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Some("Password must be at least 8 characters long");
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_upper || !has_lower || !has_digit {
        return Some(
            "Password must contain at least one uppercase letter, one lowercase letter, and one digit",
        );
    }

    None
}

/// Hash a password for storage (PHC string).
///
/// # Errors
/// Returns an error if the hashing primitive fails.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    use argon2::password_hash::{rand_core::OsRng as HashRng, SaltString};
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut HashRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored PHC hash. Malformed stored hashes
/// verify as false rather than erroring; the caller treats both the same.
pub(crate) fn verify_password(password: &str, stored_hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

/// Create a new session token for the auth cookie.
/// The raw value is only returned to set the cookie; the database stores a hash.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a session token so raw values never touch the database.
/// The hash is used for lookups when the cookie is presented.
pub(crate) fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Name of the violated unique constraint, when the database reports one.
/// Used to tell duplicate emails from taken handles at registration.
pub(crate) fn unique_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if is_unique_violation(err) => {
            db_err.constraint().map(str::to_string)
        }
        _ => None,
    }
}

/// Extract a client address for rate limiting and audit from common proxy
/// headers; falls back to a generic identifier when no header is present.
pub(crate) fn client_addr(headers: &axum::http::HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());
    if let Some(addr) = forwarded {
        return addr.to_string();
    }
    headers
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| "unknown".to_string(), str::to_string)
}
