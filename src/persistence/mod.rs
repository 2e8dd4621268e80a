//! Database layer: pool, migrations, and access for users, sessions,
//! positions, balances, the trade ledger, and preferences.

mod balances;
mod ledger;
mod pool;
mod positions;
mod preferences;
mod sessions;
mod users;

pub use balances::{BalanceRow, adjust_balance, get_balance, insert_balance};
pub use ledger::{LedgerRow, list_trades_for_user, record_trade};
pub use pool::{create_pool_and_migrate, run_migrations};
pub use positions::{
    PositionRow, delete_position, get_position, list_positions_for_user, upsert_position,
};
pub use preferences::{
    PreferencesRow, get_preferences, insert_default_preferences, update_preferences,
};
pub use sessions::{
    SessionRow, delete_session, get_session, insert_session, purge_expired_sessions,
};
pub use sqlx::SqlitePool;
pub use users::{
    UserRow, get_user_by_id, get_user_by_username, insert_user, set_active, set_last_login,
};
