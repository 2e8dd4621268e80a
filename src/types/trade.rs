use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Buy => "buy",
            TradeSide::Sell => "sell",
        }
    }
}

/// One executed trade as recorded on the ledger. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
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

/// Returned by the execution engine after a trade commits.
#[derive(Debug, Clone, Serialize)]
pub struct TradeConfirmation {
    pub ledger_entry_id: Uuid,
    pub symbol: String,
    pub side: TradeSide,
    pub shares: f64,
    pub price: f64,
    pub total_amount: f64,
    pub commission: f64,
    pub position_shares: f64,
    pub position_average_cost: f64,
    pub cash_balance: f64,
}
