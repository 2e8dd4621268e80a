use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub user_id: Uuid,
    pub dark_mode: bool,
    pub default_timeframe: String,
    pub default_chart_type: String,
    pub notifications_enabled: bool,
}

/// Partial update: only provided fields are touched. The storage layer turns
/// this into a single parameterized statement, never assembled SQL text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferencesUpdate {
    pub dark_mode: Option<bool>,
    pub default_timeframe: Option<String>,
    pub default_chart_type: Option<String>,
    pub notifications_enabled: Option<bool>,
}
