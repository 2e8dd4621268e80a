use chrono::{DateTime, Utc};
use serde::Serialize;

/// Cash plus holdings valued at cost basis. Mark-to-market against live
/// quotes is a price-collaborator concern; the core never looks prices up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountValue {
    pub cash_balance: f64,
    pub total_value: f64,
    pub last_updated: DateTime<Utc>,
}
