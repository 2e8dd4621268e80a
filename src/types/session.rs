use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Result of a successful login: the bearer token plus its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct LoginSession {
    pub user_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authenticated caller extracted from a validated session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
}
