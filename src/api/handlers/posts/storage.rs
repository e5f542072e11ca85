//! Database helpers for posts.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{excerpt, PostResponse};

const POST_COLUMNS: &str = "id, title, body, excerpt, user_id, handle, nickname, created_at";

fn post_from_row(row: &sqlx::postgres::PgRow) -> PostResponse {
    PostResponse {
        id: row.get("id"),
        title: row.get("title"),
        content: row.get("body"),
        excerpt: row.get("excerpt"),
        user_id: row.get("user_id"),
        handle: row.get("handle"),
        nickname: row.get("nickname"),
        created_at: row.get("created_at"),
    }
}

/// Insert a post, snapshotting the author's handle/nickname and deriving
/// the excerpt from the body.
pub(crate) async fn insert_post(
    pool: &PgPool,
    user_id: Uuid,
    handle: &str,
    nickname: &str,
    title: &str,
    body: &str,
) -> Result<PostResponse> {
    let query = format!(
        r"
        INSERT INTO posts (user_id, title, body, handle, nickname, excerpt)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {POST_COLUMNS}
    "
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(title)
        .bind(body)
        .bind(handle)
        .bind(nickname)
        .bind(excerpt(body))
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert post")?;

    Ok(post_from_row(&row))
}

/// All posts, newest first.
pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<PostResponse>> {
    let query = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list posts")?;

    Ok(rows.iter().map(post_from_row).collect())
}

/// One user's posts, newest first.
pub(crate) async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<PostResponse>> {
    let query = format!(
        "SELECT {POST_COLUMNS} FROM posts WHERE user_id = $1 ORDER BY created_at DESC"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let rows = sqlx::query(&query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list posts by user")?;

    Ok(rows.iter().map(post_from_row).collect())
}

pub(crate) async fn get_by_id(pool: &PgPool, post_id: Uuid) -> Result<Option<PostResponse>> {
    let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(&query)
        .bind(post_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to fetch post")?;

    Ok(row.as_ref().map(post_from_row))
}
