//! Database helpers for users and sessions.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::{generate_session_token, hash_session_token, unique_constraint};

const USERS_EMAIL_CONSTRAINT: &str = "users_email_key";
const USERS_HANDLE_CONSTRAINT: &str = "users_handle_key";

const ADMIN_HANDLE: &str = "@admin";
const ADMIN_EMAIL: &str = "admin@quill.blog";

/// Stored credential for one account. Federation-only accounts carry no
/// password at all; the distinction is a branch, not a null check.
#[derive(Clone, Debug)]
pub(crate) enum Credential {
    None,
    PasswordHash(String),
}

impl Credential {
    fn from_column(column: Option<String>) -> Self {
        match column {
            Some(hash) => Self::PasswordHash(hash),
            None => Self::None,
        }
    }
}

/// Full identity record as handlers need it. `handle`/`nickname` stay empty
/// until profile setup completes.
#[derive(Clone, Debug)]
pub(crate) struct UserRecord {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) display_name: String,
    pub(crate) handle: Option<String>,
    pub(crate) nickname: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) credential: Credential,
}

/// Minimal data behind a valid session cookie; profile fields are
/// re-resolved on every lookup so setup completion shows up immediately.
#[derive(Clone, Debug)]
pub(crate) struct SessionRecord {
    pub(crate) user_id: Uuid,
    pub(crate) email: String,
    pub(crate) display_name: String,
    pub(crate) handle: Option<String>,
    pub(crate) nickname: Option<String>,
    pub(crate) avatar_url: Option<String>,
}

/// Outcome when inserting a new user.
#[derive(Debug)]
pub(crate) enum InsertUserOutcome {
    Created(UserRecord),
    DuplicateEmail,
    HandleTaken,
}

/// Outcome when completing profile setup.
#[derive(Debug)]
pub(crate) enum ProfileSetupOutcome {
    Updated,
    AlreadyCompleted,
    HandleTaken,
    NotFound,
}

fn user_record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        user_id: row.get("id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        handle: row.get("handle"),
        nickname: row.get("nickname"),
        avatar_url: row.get("avatar_url"),
        credential: Credential::from_column(row.get("password_hash")),
    }
}

/// Look up a user by normalized handle (used by login and profile pages).
pub(crate) async fn lookup_user_by_handle(
    pool: &PgPool,
    handle_normalized: &str,
) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, display_name, handle, nickname, avatar_url, password_hash
        FROM users
        WHERE LOWER(handle) = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(handle_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by handle")?;

    Ok(row.as_ref().map(user_record_from_row))
}

/// Look up a user by normalized email (federated sign-in correlation).
pub(crate) async fn lookup_user_by_email(
    pool: &PgPool,
    email_normalized: &str,
) -> Result<Option<UserRecord>> {
    let query = r"
        SELECT id, email, display_name, handle, nickname, avatar_url, password_hash
        FROM users
        WHERE email = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email_normalized)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.as_ref().map(user_record_from_row))
}

/// Whether no user currently holds the normalized handle.
pub(crate) async fn handle_available(pool: &PgPool, handle_normalized: &str) -> Result<bool> {
    let query = "SELECT EXISTS (SELECT 1 FROM users WHERE LOWER(handle) = $1)";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(handle_normalized)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to check handle availability")?;

    let taken: bool = row.get(0);
    Ok(!taken)
}

/// Insert a new user. Unique violations are classified by constraint so
/// registration can report duplicate email and taken handle distinctly; the
/// pre-checks in the handler make these rare, the constraints make them safe.
pub(crate) async fn insert_user(
    pool: &PgPool,
    email: &str,
    display_name: &str,
    handle: Option<&str>,
    nickname: Option<&str>,
    avatar_url: Option<&str>,
    password_hash: Option<&str>,
) -> Result<InsertUserOutcome> {
    let query = r"
        INSERT INTO users (email, display_name, handle, nickname, avatar_url, password_hash)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, email, display_name, handle, nickname, avatar_url, password_hash
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(display_name)
        .bind(handle)
        .bind(nickname)
        .bind(avatar_url)
        .bind(password_hash)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(InsertUserOutcome::Created(user_record_from_row(&row))),
        Err(err) => match unique_constraint(&err).as_deref() {
            Some(USERS_EMAIL_CONSTRAINT) => Ok(InsertUserOutcome::DuplicateEmail),
            Some(USERS_HANDLE_CONSTRAINT) => Ok(InsertUserOutcome::HandleTaken),
            _ => Err(err).context("failed to insert user"),
        },
    }
}

/// Complete profile setup: assign handle and nickname exactly once.
/// The `handle IS NULL` predicate is what makes setup one-shot; a completed
/// profile never matches again.
pub(crate) async fn set_profile(
    pool: &PgPool,
    user_id: Uuid,
    handle: &str,
    nickname: &str,
) -> Result<ProfileSetupOutcome> {
    let query = r"
        UPDATE users
        SET handle = $1, nickname = $2
        WHERE id = $3 AND handle IS NULL
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(handle)
        .bind(nickname)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await;

    match result {
        Ok(done) if done.rows_affected() > 0 => Ok(ProfileSetupOutcome::Updated),
        Ok(_) => {
            // No row matched: either the profile is already complete or the
            // user vanished. Tell them apart for the caller.
            let query = "SELECT handle FROM users WHERE id = $1";
            let span = tracing::info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(user_id)
                .fetch_optional(pool)
                .instrument(span)
                .await
                .context("failed to re-check profile state")?;
            match row {
                Some(_) => Ok(ProfileSetupOutcome::AlreadyCompleted),
                None => Ok(ProfileSetupOutcome::NotFound),
            }
        }
        Err(err) => match unique_constraint(&err).as_deref() {
            Some(USERS_HANDLE_CONSTRAINT) => Ok(ProfileSetupOutcome::HandleTaken),
            _ => Err(err).context("failed to set profile"),
        },
    }
}

/// Create a session row and return the raw token for the cookie.
/// Only the hash is stored.
pub(crate) async fn insert_session(
    pool: &PgPool,
    user_id: Uuid,
    ttl_seconds: i64,
) -> Result<String> {
    let token = generate_session_token()?;
    let token_hash = hash_session_token(&token);

    let query = r"
        INSERT INTO sessions (user_id, token_hash, expires_at)
        VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(user_id)
        .bind(token_hash)
        .bind(ttl_seconds)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert session")?;

    Ok(token)
}

/// Resolve a session token hash to its user, joining the live profile so
/// handle/nickname reflect any setup completed since sign-in.
pub(crate) async fn lookup_session(
    pool: &PgPool,
    token_hash: &[u8],
) -> Result<Option<SessionRecord>> {
    let query = r"
        SELECT s.user_id, u.email, u.display_name, u.handle, u.nickname, u.avatar_url
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token_hash = $1 AND s.expires_at > NOW()
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(token_hash)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup session")?;

    Ok(row.map(|row| SessionRecord {
        user_id: row.get("user_id"),
        email: row.get("email"),
        display_name: row.get("display_name"),
        handle: row.get("handle"),
        nickname: row.get("nickname"),
        avatar_url: row.get("avatar_url"),
    }))
}

/// Delete a session row by token hash; missing rows are a no-op.
pub(crate) async fn delete_session(pool: &PgPool, token_hash: &[u8]) -> Result<()> {
    let query = "DELETE FROM sessions WHERE token_hash = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(token_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete session")?;

    Ok(())
}

/// Create the reserved administrator account once, when an initial admin
/// password is configured. Returns true when the account was created by
/// this call.
pub(crate) async fn bootstrap_admin(pool: &PgPool, password_hash: &str) -> Result<bool> {
    let query = r"
        INSERT INTO users (email, display_name, handle, nickname, password_hash)
        SELECT $1, 'Admin', $2, 'Admin', $3
        WHERE NOT EXISTS (SELECT 1 FROM users WHERE LOWER(handle) = $2)
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(ADMIN_EMAIL)
        .bind(ADMIN_HANDLE)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await;

    match result {
        Ok(done) => Ok(done.rows_affected() > 0),
        // Lost a startup race with another instance; the account exists.
        Err(err) if unique_constraint(&err).is_some() => Ok(false),
        Err(err) => Err(err).context("failed to bootstrap admin account"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_from_column_branches() {
        assert!(matches!(Credential::from_column(None), Credential::None));
        assert!(matches!(
            Credential::from_column(Some("$argon2id$...".to_string())),
            Credential::PasswordHash(_)
        ));
    }
}
