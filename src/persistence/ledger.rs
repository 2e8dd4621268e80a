//! Trade ledger persistence: append on execution, list for history.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

use crate::types::trade::{LedgerEntry, TradeSide};

#[derive(Debug, FromRow)]
pub struct LedgerRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symbol: String,
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub total_amount: f64,
    pub commission: f64,
    pub executed_at: DateTime<Utc>,
}

fn ledger_row_to_entry(row: &LedgerRow) -> LedgerEntry {
    LedgerEntry {
        id: row.id,
        user_id: row.user_id,
        symbol: row.symbol.clone(),
        side: row.side,
        shares: row.shares,
        price: row.price,
        total_amount: row.total_amount,
        commission: row.commission,
        executed_at: row.executed_at,
    }
}

/// Append one executed trade. Call exactly once per trade, inside the same
/// transaction as the position and balance updates.
#[allow(clippy::too_many_arguments)]
pub async fn record_trade<'e, E>(
    executor: E,
    id: Uuid,
    user_id: Uuid,
    symbol: &str,
    side: TradeSide,
    shares: f64,
    price: f64,
    total_amount: f64,
    commission: f64,
    executed_at: DateTime<Utc>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO ledger_entries (id, user_id, symbol, side, shares, price, total_amount, commission, executed_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(id)
    .bind(user_id)
    .bind(symbol)
    .bind(side)
    .bind(shares)
    .bind(price)
    .bind(total_amount)
    .bind(commission)
    .bind(executed_at)
    .execute(executor)
    .await?;
    Ok(())
}

/// List a user's trades, most recent first (for GET /trades). The rowid
/// tiebreak keeps entries written in the same instant in append order.
pub async fn list_trades_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<LedgerEntry>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows = sqlx::query_as::<_, LedgerRow>(
        "SELECT id, user_id, symbol, side, shares, price, total_amount, commission, executed_at \
         FROM ledger_entries WHERE user_id = ?1 ORDER BY executed_at DESC, rowid DESC LIMIT ?2",
    )
    .bind(user_id)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows.iter().map(ledger_row_to_entry).collect())
}
