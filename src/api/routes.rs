//! HTTP surface: router, shared state, and request handlers. The accounts
//! and engine layers do the real work; handlers translate HTTP into typed
//! calls and typed failures into status codes.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::accounts;
use crate::api::auth;
use crate::engine::{self, TradePolicy};
use crate::error::BrokerError;
use crate::persistence;
use crate::types::balance::AccountValue;
use crate::types::position::Position;
use crate::types::preferences::{Preferences, PreferencesUpdate};
use crate::types::session::{AuthUser, LoginSession};
use crate::types::trade::{LedgerEntry, TradeConfirmation, TradeSide};
use crate::types::user::{NewUser, User};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub policy: TradePolicy,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/session", get(session))
        .route("/portfolio", get(portfolio))
        .route("/balance", get(balance))
        .route("/trades", post(execute_trade).get(trade_history))
        .route("/preferences", get(get_preferences).put(put_preferences))
        .with_state(state)
}

async fn health() -> &'static str {
    "healthy"
}

/// Every state-mutating route (and the account reads) goes through here.
async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, BrokerError> {
    let token = auth::bearer_token(headers).ok_or(BrokerError::SessionExpiredOrInvalid)?;
    accounts::validate_session(&state.db, token).await
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    username: String,
    password: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user_id: Uuid,
    username: String,
}

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Response, BrokerError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        let body = Json(serde_json::json!({ "error": "username and password are required" }));
        return Ok((StatusCode::BAD_REQUEST, body).into_response());
    }
    let username = req.username.trim().to_lowercase();
    let new_user = NewUser {
        username: username.clone(),
        password: req.password,
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
    };
    let user_id = accounts::register(&state.db, &new_user).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user_id, username })).into_response())
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginSession>, BrokerError> {
    let session = accounts::login(&state.db, &req.username, &req.password).await?;
    Ok(Json(session))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, BrokerError> {
    let token = auth::bearer_token(&headers).ok_or(BrokerError::SessionExpiredOrInvalid)?;
    accounts::logout(&state.db, token).await?;
    Ok(Json(serde_json::json!({ "status": "logged out" })))
}

async fn session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let user = accounts::profile(&state.db, caller.user_id).await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize)]
struct PortfolioParams {
    symbol: Option<String>,
}

#[derive(Debug, Serialize)]
struct PortfolioResponse {
    positions: Vec<Position>,
}

async fn portfolio(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PortfolioParams>,
) -> Result<Json<PortfolioResponse>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let positions = engine::portfolio(&state.db, caller.user_id, params.symbol.as_deref()).await?;
    Ok(Json(PortfolioResponse { positions }))
}

async fn balance(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AccountValue>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let value = engine::account_value(&state.db, caller.user_id).await?;
    Ok(Json(value))
}

#[derive(Debug, Deserialize)]
struct TradeRequest {
    symbol: String,
    side: TradeSide,
    shares: f64,
    price: f64,
}

async fn execute_trade(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<TradeRequest>,
) -> Result<Json<TradeConfirmation>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let confirmation = engine::execute(
        &state.db,
        state.policy,
        caller.user_id,
        &req.symbol,
        req.side,
        req.shares,
        req.price,
    )
    .await?;
    Ok(Json(confirmation))
}

#[derive(Debug, Deserialize)]
struct HistoryParams {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    trades: Vec<LedgerEntry>,
}

async fn trade_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let trades = engine::history(&state.db, caller.user_id, params.limit.unwrap_or(50)).await?;
    Ok(Json(HistoryResponse { trades }))
}

fn preferences_from_row(row: persistence::PreferencesRow) -> Preferences {
    Preferences {
        user_id: row.user_id,
        dark_mode: row.dark_mode,
        default_timeframe: row.default_timeframe,
        default_chart_type: row.default_chart_type,
        notifications_enabled: row.notifications_enabled,
    }
}

async fn get_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Preferences>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    let row = persistence::get_preferences(&state.db, caller.user_id)
        .await?
        .ok_or(BrokerError::Storage(sqlx::Error::RowNotFound))?;
    Ok(Json(preferences_from_row(row)))
}

async fn put_preferences(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<PreferencesUpdate>,
) -> Result<Json<Preferences>, BrokerError> {
    let caller = authorize(&state, &headers).await?;
    persistence::update_preferences(&state.db, caller.user_id, &update).await?;
    let row = persistence::get_preferences(&state.db, caller.user_id)
        .await?
        .ok_or(BrokerError::Storage(sqlx::Error::RowNotFound))?;
    Ok(Json(preferences_from_row(row)))
}
