//! Session persistence: token rows with expiry. Logout is a hard delete.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct SessionRow {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Insert a session row. Token must be unique; the caller generates it from a
/// cryptographically secure source.
pub async fn insert_session<'e, E>(
    executor: E,
    token: &str,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(token)
    .bind(user_id)
    .bind(created_at)
    .bind(expires_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Look a session up by token. Expiry is checked by the caller.
pub async fn get_session<'e, E>(executor: E, token: &str) -> Result<Option<SessionRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, SessionRow>(
        "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
    )
    .bind(token)
    .fetch_optional(executor)
    .await
}

/// Delete a session. Returns the number of rows removed; deleting an unknown
/// token is not an error.
pub async fn delete_session<'e, E>(executor: E, token: &str) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE token = ?1")
        .bind(token)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

/// Remove sessions past expiry. Validation ignores expired rows regardless;
/// this only keeps the table from growing.
pub async fn purge_expired_sessions<'e, E>(
    executor: E,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
        .bind(now)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
