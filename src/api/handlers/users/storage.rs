//! Database helpers for the social graph.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

/// Insert a follow edge; inserting an existing edge is a no-op.
pub(crate) async fn follow(pool: &PgPool, follower_id: Uuid, followee_id: Uuid) -> Result<()> {
    let query = r"
        INSERT INTO follows (follower_id, followee_id)
        VALUES ($1, $2)
        ON CONFLICT (follower_id, followee_id) DO NOTHING
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT"
    );
    sqlx::query(query)
        .bind(follower_id)
        .bind(followee_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to insert follow edge")?;

    Ok(())
}

/// Delete a follow edge; a missing edge is a no-op, not an error.
pub(crate) async fn unfollow(pool: &PgPool, follower_id: Uuid, followee_id: Uuid) -> Result<()> {
    let query = "DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "DELETE"
    );
    sqlx::query(query)
        .bind(follower_id)
        .bind(followee_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to delete follow edge")?;

    Ok(())
}

pub(crate) async fn follower_count(pool: &PgPool, user_id: Uuid) -> Result<i64> {
    let query = "SELECT COUNT(*) FROM follows WHERE followee_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count followers")?;

    Ok(row.get(0))
}

pub(crate) async fn following_count(pool: &PgPool, user_id: Uuid) -> Result<i64> {
    let query = "SELECT COUNT(*) FROM follows WHERE follower_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to count following")?;

    Ok(row.get(0))
}

pub(crate) async fn is_following(
    pool: &PgPool,
    follower_id: Uuid,
    followee_id: Uuid,
) -> Result<bool> {
    let query =
        "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followee_id = $2)";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT"
    );
    let row = sqlx::query(query)
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to check follow edge")?;

    Ok(row.get(0))
}
