//! Position persistence: get, upsert, delete-on-close, list.

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct PositionRow {
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: f64,
    pub average_cost: f64,
}

/// Get one position. For the engine's read-before-write inside a trade
/// transaction.
pub async fn get_position<'e, E>(
    executor: E,
    user_id: Uuid,
    symbol: &str,
) -> Result<Option<PositionRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, PositionRow>(
        "SELECT user_id, symbol, shares, average_cost FROM positions \
         WHERE user_id = ?1 AND symbol = ?2",
    )
    .bind(user_id)
    .bind(symbol)
    .fetch_optional(executor)
    .await
}

/// Upsert a position (insert or update on conflict).
pub async fn upsert_position<'e, E>(
    executor: E,
    user_id: Uuid,
    symbol: &str,
    shares: f64,
    average_cost: f64,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO positions (user_id, symbol, shares, average_cost, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5) \
         ON CONFLICT (user_id, symbol) DO UPDATE SET shares = ?3, average_cost = ?4, updated_at = ?5",
    )
    .bind(user_id)
    .bind(symbol)
    .bind(shares)
    .bind(average_cost)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Remove a position. Called when a sell brings shares to exactly zero.
pub async fn delete_position<'e, E>(
    executor: E,
    user_id: Uuid,
    symbol: &str,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM positions WHERE user_id = ?1 AND symbol = ?2")
        .bind(user_id)
        .bind(symbol)
        .execute(executor)
        .await?;
    Ok(())
}

/// List positions for a user, optional symbol filter (for GET /portfolio).
pub async fn list_positions_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
    symbol_filter: Option<&str>,
) -> Result<Vec<PositionRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    if let Some(symbol) = symbol_filter {
        sqlx::query_as::<_, PositionRow>(
            "SELECT user_id, symbol, shares, average_cost FROM positions \
             WHERE user_id = ?1 AND symbol = ?2",
        )
        .bind(user_id)
        .bind(symbol)
        .fetch_all(executor)
        .await
    } else {
        sqlx::query_as::<_, PositionRow>(
            "SELECT user_id, symbol, shares, average_cost FROM positions WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}
