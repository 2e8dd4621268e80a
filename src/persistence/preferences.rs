//! Preferences persistence: defaults at registration, partial updates.

use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

use crate::types::preferences::PreferencesUpdate;

#[derive(Debug, FromRow)]
pub struct PreferencesRow {
    pub user_id: Uuid,
    pub dark_mode: bool,
    pub default_timeframe: String,
    pub default_chart_type: String,
    pub notifications_enabled: bool,
}

/// Create the defaults row. Runs in the registration transaction.
pub async fn insert_default_preferences<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO preferences (user_id, dark_mode, default_timeframe, default_chart_type, notifications_enabled) \
         VALUES (?1, 1, '1D', 'candlestick', 1)",
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_preferences<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<PreferencesRow>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, PreferencesRow>(
        "SELECT user_id, dark_mode, default_timeframe, default_chart_type, notifications_enabled \
         FROM preferences WHERE user_id = ?1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Apply a partial update. Absent fields bind NULL and COALESCE keeps the
/// stored value, so one parameterized statement covers every combination.
pub async fn update_preferences<'e, E>(
    executor: E,
    user_id: Uuid,
    update: &PreferencesUpdate,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "UPDATE preferences SET \
           dark_mode = COALESCE(?1, dark_mode), \
           default_timeframe = COALESCE(?2, default_timeframe), \
           default_chart_type = COALESCE(?3, default_chart_type), \
           notifications_enabled = COALESCE(?4, notifications_enabled) \
         WHERE user_id = ?5",
    )
    .bind(update.dark_mode)
    .bind(update.default_timeframe.as_deref())
    .bind(update.default_chart_type.as_deref())
    .bind(update.notifications_enabled)
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}
