//! Balance persistence: one cash row per user, created at registration.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct BalanceRow {
    pub user_id: Uuid,
    pub cash_balance: f64,
    pub last_updated: DateTime<Utc>,
}

/// Create the balance row with the registration endowment.
pub async fn insert_balance<'e, E>(
    executor: E,
    user_id: Uuid,
    cash_balance: f64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("INSERT INTO balances (user_id, cash_balance, last_updated) VALUES (?1, ?2, ?3)")
        .bind(user_id)
        .bind(cash_balance)
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// Get the balance row. Every registered user has one.
pub async fn get_balance<'e, E>(executor: E, user_id: Uuid) -> Result<BalanceRow, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, BalanceRow>(
        "SELECT user_id, cash_balance, last_updated FROM balances WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// Adjust cash by a signed delta: negative for buys, positive for sells.
pub async fn adjust_balance<'e, E>(
    executor: E,
    user_id: Uuid,
    delta: f64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "UPDATE balances SET cash_balance = cash_balance + ?1, last_updated = ?2 WHERE user_id = ?3",
    )
    .bind(delta)
    .bind(now)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}
