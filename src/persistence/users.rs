//! User persistence: credential rows and the soft-disable flag.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

/// Row returned from DB (username is stored lowercase).
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Get a user by username (lowercase). For login.
pub async fn get_user_by_username<'e, E>(
    executor: E,
    username_lowercase: &str,
) -> Result<Option<UserRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, password_hash, first_name, last_name, is_active, created_at, last_login \
         FROM users WHERE username = ?1",
    )
    .bind(username_lowercase)
    .fetch_optional(executor)
    .await
}

/// Get a user by id. For session validation and profile reads.
pub async fn get_user_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<UserRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, password_hash, first_name, last_name, is_active, created_at, last_login \
         FROM users WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

/// Insert a user. Username must already be lowercase.
#[allow(clippy::too_many_arguments)]
pub async fn insert_user<'e, E>(
    executor: E,
    id: Uuid,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
    first_name: Option<&str>,
    last_name: Option<&str>,
    created_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO users (id, username, email, password_hash, first_name, last_name, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(first_name)
    .bind(last_name)
    .bind(created_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// Stamp a successful login.
pub async fn set_last_login<'e, E>(
    executor: E,
    id: Uuid,
    when: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE users SET last_login = ?1 WHERE id = ?2")
        .bind(when)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Soft-disable. Users are never physically deleted.
pub async fn set_active<'e, E>(executor: E, id: Uuid, active: bool) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE users SET is_active = ?1 WHERE id = ?2")
        .bind(active)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(())
}
