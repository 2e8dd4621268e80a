//! Accounts: registration, login, session validation, logout, deactivation.
//! Testable without HTTP.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::api::auth;
use crate::error::BrokerError;
use crate::persistence;
use crate::types::session::{AuthUser, LoginSession};
use crate::types::user::{NewUser, User};

/// Cash endowment granted once at registration.
pub const STARTING_CASH: f64 = 100_000.0;

fn user_row_to_user(row: &persistence::UserRow) -> User {
    User {
        id: row.id,
        username: row.username.clone(),
        email: row.email.clone(),
        first_name: row.first_name.clone(),
        last_name: row.last_name.clone(),
        is_active: row.is_active,
        created_at: row.created_at,
        last_login: row.last_login,
    }
}

/// Create a user with their starting balance and default preferences in one
/// transaction. Username is normalized to lowercase before storage.
pub async fn register(pool: &SqlitePool, new_user: &NewUser) -> Result<Uuid, BrokerError> {
    let username = new_user.username.trim().to_lowercase();
    let email = new_user
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let password_hash = auth::hash_password(&new_user.password)?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let inserted = persistence::insert_user(
        &mut *tx,
        id,
        &username,
        email,
        &password_hash,
        new_user.first_name.as_deref(),
        new_user.last_name.as_deref(),
        now,
    )
    .await;
    if let Err(e) = inserted {
        return Err(match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => BrokerError::DuplicateIdentity,
            other => other.into(),
        });
    }
    persistence::insert_balance(&mut *tx, id, STARTING_CASH, now).await?;
    persistence::insert_default_preferences(&mut *tx, id).await?;
    tx.commit().await?;

    info!(user_id = %id, username = %username, "user registered");
    Ok(id)
}

/// Verify credentials and open a session. The failure reason never says
/// whether the username or the password was wrong.
pub async fn login(
    pool: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<LoginSession, BrokerError> {
    let username = username.trim().to_lowercase();
    let user = match persistence::get_user_by_username(pool, &username).await? {
        Some(user) if user.is_active => user,
        _ => {
            warn!(username = %username, "login failed");
            return Err(BrokerError::InvalidCredentials);
        }
    };
    if !auth::verify_password(password, &user.password_hash) {
        warn!(username = %username, "login failed");
        return Err(BrokerError::InvalidCredentials);
    }

    let now = Utc::now();
    let token = auth::generate_session_token();
    let expires_at = now + chrono::Duration::hours(auth::SESSION_TTL_HOURS);

    // Last-login stamp and session insert are one unit.
    let mut tx = pool.begin().await?;
    persistence::set_last_login(&mut *tx, user.id, now).await?;
    persistence::insert_session(&mut *tx, &token, user.id, now, expires_at).await?;
    tx.commit().await?;

    info!(user_id = %user.id, "login succeeded");
    Ok(LoginSession {
        user_id: user.id,
        token,
        expires_at,
    })
}

/// Resolve a bearer token to its user. Requires the session row to exist,
/// expiry strictly in the future, and the owning user to be active.
pub async fn validate_session(pool: &SqlitePool, token: &str) -> Result<AuthUser, BrokerError> {
    let Some(session) = persistence::get_session(pool, token).await? else {
        return Err(BrokerError::SessionExpiredOrInvalid);
    };
    if session.expires_at <= Utc::now() {
        return Err(BrokerError::SessionExpiredOrInvalid);
    }
    let Some(user) = persistence::get_user_by_id(pool, session.user_id).await? else {
        return Err(BrokerError::SessionExpiredOrInvalid);
    };
    if !user.is_active {
        return Err(BrokerError::SessionExpiredOrInvalid);
    }
    Ok(AuthUser {
        user_id: user.id,
        username: user.username,
    })
}

/// Revoke a session. Idempotent: an unknown or already-expired token is fine.
pub async fn logout(pool: &SqlitePool, token: &str) -> Result<(), BrokerError> {
    let removed = persistence::delete_session(pool, token).await?;
    if removed > 0 {
        info!("session revoked");
    }
    Ok(())
}

/// Soft-disable an account. Existing sessions stop validating immediately.
pub async fn deactivate(pool: &SqlitePool, user_id: Uuid) -> Result<(), BrokerError> {
    persistence::set_active(pool, user_id, false).await?;
    info!(user_id = %user_id, "user deactivated");
    Ok(())
}

/// Profile for an authenticated user.
pub async fn profile(pool: &SqlitePool, user_id: Uuid) -> Result<User, BrokerError> {
    let row = persistence::get_user_by_id(pool, user_id)
        .await?
        .ok_or(BrokerError::SessionExpiredOrInvalid)?;
    Ok(user_row_to_user(&row))
}
