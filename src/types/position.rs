use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position per (user, symbol). Shares are non-negative; a row exists only
/// while shares > 0. `average_cost` is the blended acquisition price of the
/// currently held shares, recomputed on buys and untouched by sells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub user_id: Uuid,
    pub symbol: String,
    pub shares: f64,
    pub average_cost: f64,
}
