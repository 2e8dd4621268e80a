//! Trade execution engine: ledger append, portfolio update, and balance
//! update as one atomic unit per trade. Testable without HTTP.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::error::BrokerError;
use crate::persistence;
use crate::types::balance::AccountValue;
use crate::types::position::Position;
use crate::types::trade::{LedgerEntry, TradeConfirmation, TradeSide};

/// Flat per-trade commission, recorded on each ledger entry. Cash moves by
/// exactly shares * price.
pub const COMMISSION: f64 = 9.99;

const HISTORY_LIMIT_MAX: i64 = 500;

/// Engine knobs. With solvency enforcement on, buys that would drive the
/// cash balance negative are rejected.
#[derive(Debug, Clone, Copy)]
pub struct TradePolicy {
    pub commission: f64,
    pub enforce_buy_solvency: bool,
}

impl Default for TradePolicy {
    fn default() -> Self {
        Self {
            commission: COMMISSION,
            enforce_buy_solvency: true,
        }
    }
}

/// Execute one trade. Reads current position and balance, computes the new
/// state, and commits ledger entry + position + balance together or not at
/// all; any early return rolls the transaction back.
pub async fn execute(
    pool: &SqlitePool,
    policy: TradePolicy,
    user_id: Uuid,
    symbol: &str,
    side: TradeSide,
    shares: f64,
    price: f64,
) -> Result<TradeConfirmation, BrokerError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(BrokerError::InvalidTradeParameters(
            "symbol is required".to_string(),
        ));
    }
    if !(shares.is_finite() && shares > 0.0) {
        return Err(BrokerError::InvalidTradeParameters(
            "share count must be positive".to_string(),
        ));
    }
    if !(price.is_finite() && price > 0.0) {
        return Err(BrokerError::InvalidTradeParameters(
            "price must be positive".to_string(),
        ));
    }

    let total_amount = shares * price;
    let now = Utc::now();

    let mut tx = pool.begin().await?;
    let balance = persistence::get_balance(&mut *tx, user_id).await?;
    let existing = persistence::get_position(&mut *tx, user_id, &symbol).await?;

    let (new_shares, new_average, new_cash) = match side {
        TradeSide::Buy => {
            if policy.enforce_buy_solvency && balance.cash_balance < total_amount {
                return Err(BrokerError::InsufficientFunds);
            }
            // Weighted average over the pre-trade position; O(1) per trade.
            let (new_shares, new_average) = match &existing {
                Some(pos) => {
                    let new_shares = pos.shares + shares;
                    let new_average =
                        (pos.shares * pos.average_cost + shares * price) / new_shares;
                    (new_shares, new_average)
                }
                None => (shares, price),
            };
            persistence::upsert_position(&mut *tx, user_id, &symbol, new_shares, new_average, now)
                .await?;
            persistence::adjust_balance(&mut *tx, user_id, -total_amount, now).await?;
            (new_shares, new_average, balance.cash_balance - total_amount)
        }
        TradeSide::Sell => {
            let pos = match existing {
                Some(pos) if pos.shares >= shares => pos,
                _ => return Err(BrokerError::InsufficientShares),
            };
            let new_shares = pos.shares - shares;
            // Selling never reprices the remaining lot.
            if new_shares == 0.0 {
                persistence::delete_position(&mut *tx, user_id, &symbol).await?;
            } else {
                persistence::upsert_position(
                    &mut *tx,
                    user_id,
                    &symbol,
                    new_shares,
                    pos.average_cost,
                    now,
                )
                .await?;
            }
            persistence::adjust_balance(&mut *tx, user_id, total_amount, now).await?;
            (new_shares, pos.average_cost, balance.cash_balance + total_amount)
        }
    };

    let entry_id = Uuid::new_v4();
    persistence::record_trade(
        &mut *tx,
        entry_id,
        user_id,
        &symbol,
        side,
        shares,
        price,
        total_amount,
        policy.commission,
        now,
    )
    .await?;
    tx.commit().await?;

    info!(
        user_id = %user_id,
        symbol = %symbol,
        side = side.as_str(),
        shares,
        price,
        total_amount,
        "trade executed"
    );

    Ok(TradeConfirmation {
        ledger_entry_id: entry_id,
        symbol,
        side,
        shares,
        price,
        total_amount,
        commission: policy.commission,
        position_shares: new_shares,
        position_average_cost: new_average,
        cash_balance: new_cash,
    })
}

/// Positions currently held by a user (only shares > 0 rows exist), with an
/// optional symbol filter.
pub async fn portfolio(
    pool: &SqlitePool,
    user_id: Uuid,
    symbol_filter: Option<&str>,
) -> Result<Vec<Position>, BrokerError> {
    let filter = symbol_filter.map(|s| s.trim().to_uppercase());
    let rows = persistence::list_positions_for_user(pool, user_id, filter.as_deref()).await?;
    Ok(rows
        .into_iter()
        .map(|row| Position {
            user_id: row.user_id,
            symbol: row.symbol,
            shares: row.shares,
            average_cost: row.average_cost,
        })
        .collect())
}

/// A user's trades, most recent first, bounded by `limit`. Re-queryable
/// snapshot, not a live stream.
pub async fn history(
    pool: &SqlitePool,
    user_id: Uuid,
    limit: i64,
) -> Result<Vec<LedgerEntry>, BrokerError> {
    let limit = limit.clamp(1, HISTORY_LIMIT_MAX);
    Ok(persistence::list_trades_for_user(pool, user_id, limit).await?)
}

/// Cash plus holdings valued at cost basis, read from one snapshot.
/// Mark-to-market against live quotes belongs to a price collaborator.
pub async fn account_value(pool: &SqlitePool, user_id: Uuid) -> Result<AccountValue, BrokerError> {
    let mut tx = pool.begin().await?;
    let balance = persistence::get_balance(&mut *tx, user_id).await?;
    let positions = persistence::list_positions_for_user(&mut *tx, user_id, None).await?;
    tx.commit().await?;

    let holdings: f64 = positions.iter().map(|p| p.shares * p.average_cost).sum();
    Ok(AccountValue {
        cash_balance: balance.cash_balance,
        total_value: balance.cash_balance + holdings,
        last_updated: balance.last_updated,
    })
}
