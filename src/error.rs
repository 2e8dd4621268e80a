//! Error taxonomy shared by the accounts layer, the execution engine, and the
//! HTTP surface. Every public operation returns a typed failure; nothing
//! panics past the component boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("username or email already taken")]
    DuplicateIdentity,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid or expired session")]
    SessionExpiredOrInvalid,

    #[error("invalid trade parameters: {0}")]
    InvalidTradeParameters(String),

    #[error("insufficient shares to sell")]
    InsufficientShares,

    #[error("insufficient funds")]
    InsufficientFunds,

    #[error("storage unavailable: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("credential hashing failed")]
    Credential(#[from] argon2::password_hash::Error),
}

impl BrokerError {
    fn status(&self) -> StatusCode {
        match self {
            BrokerError::DuplicateIdentity
            | BrokerError::InvalidTradeParameters(_)
            | BrokerError::InsufficientShares
            | BrokerError::InsufficientFunds => StatusCode::BAD_REQUEST,
            BrokerError::InvalidCredentials | BrokerError::SessionExpiredOrInvalid => {
                StatusCode::UNAUTHORIZED
            }
            BrokerError::Storage(_) | BrokerError::Credential(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
