//! Trade execution and ledger integration tests over HTTP: the full
//! register → trade → history flow, money conservation, and failure paths.

use rust_broker::api::routes::{AppState, app_router};
use rust_broker::engine::TradePolicy;
use rust_broker::persistence::create_pool_and_migrate;

async fn spawn_app() -> String {
    let pool = create_pool_and_migrate("sqlite::memory:").await.unwrap();
    let state = AppState {
        db: pool,
        policy: TradePolicy::default(),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn register_and_login(client: &reqwest::Client, base_url: &str, username: &str) -> String {
    let reg = client
        .post(format!("{}/auth/register", base_url))
        .json(&serde_json::json!({ "username": username, "password": "pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(reg.status().as_u16(), 201);

    let login: serde_json::Value = client
        .post(format!("{}/auth/login", base_url))
        .json(&serde_json::json!({ "username": username, "password": "pw" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    login.get("token").unwrap().as_str().unwrap().to_string()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[tokio::test]
async fn end_to_end_buy_then_sell_keeps_ledger_and_balances_in_lockstep() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "alice").await;

    // Buy 50 @ $100: $5,000 out of the $100,000 endowment.
    let buy = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "buy", "shares": 50.0, "price": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(buy.status().as_u16(), 200);
    let buy: serde_json::Value = buy.json().await.unwrap();
    assert_close(buy["total_amount"].as_f64().unwrap(), 5_000.0);
    assert_close(buy["cash_balance"].as_f64().unwrap(), 95_000.0);
    assert_close(buy["position_shares"].as_f64().unwrap(), 50.0);
    assert_close(buy["position_average_cost"].as_f64().unwrap(), 100.0);

    // Sell 20 @ $120: $2,400 back; the remaining lot keeps its cost basis.
    let sell = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "sell", "shares": 20.0, "price": 120.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(sell.status().as_u16(), 200);
    let sell: serde_json::Value = sell.json().await.unwrap();
    assert_close(sell["cash_balance"].as_f64().unwrap(), 97_400.0);
    assert_close(sell["position_shares"].as_f64().unwrap(), 30.0);
    assert_close(sell["position_average_cost"].as_f64().unwrap(), 100.0);

    let balance: serde_json::Value = client
        .get(format!("{}/balance", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_close(balance["cash_balance"].as_f64().unwrap(), 97_400.0);

    let portfolio: serde_json::Value = client
        .get(format!("{}/portfolio", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let positions = portfolio["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_close(positions[0]["shares"].as_f64().unwrap(), 30.0);
    assert_close(positions[0]["average_cost"].as_f64().unwrap(), 100.0);

    // Exactly two ledger entries, most recent first, commission recorded.
    let history: serde_json::Value = client
        .get(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let trades = history["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0]["side"].as_str(), Some("sell"));
    assert_close(trades[0]["total_amount"].as_f64().unwrap(), 2_400.0);
    assert_eq!(trades[1]["side"].as_str(), Some("buy"));
    assert_close(trades[1]["total_amount"].as_f64().unwrap(), 5_000.0);
    assert_close(trades[0]["commission"].as_f64().unwrap(), 9.99);
    assert_close(trades[1]["commission"].as_f64().unwrap(), 9.99);
}

#[tokio::test]
async fn trade_history_is_bounded_by_limit() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "bob").await;

    for price in [10.0, 20.0, 30.0] {
        let res = client
            .post(format!("{}/trades", base_url))
            .header("Authorization", format!("Bearer {}", token))
            .json(&serde_json::json!({
                "symbol": "MSFT", "side": "buy", "shares": 1.0, "price": price
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status().as_u16(), 200);
    }

    let history: serde_json::Value = client
        .get(format!("{}/trades?limit=2", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let trades = history["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 2);
    assert_close(trades[0]["price"].as_f64().unwrap(), 30.0);
    assert_close(trades[1]["price"].as_f64().unwrap(), 20.0);
}

#[tokio::test]
async fn trade_requires_a_session() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/trades", base_url))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "buy", "shares": 1.0, "price": 10.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn oversell_returns_400_and_changes_nothing() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "carol").await;

    let res = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "sell", "shares": 10.0, "price": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("insufficient shares"));

    let balance: serde_json::Value = client
        .get(format!("{}/balance", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_close(balance["cash_balance"].as_f64().unwrap(), 100_000.0);

    let history: serde_json::Value = client
        .get(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["trades"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn buy_beyond_cash_returns_400() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "dave").await;

    let res = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "buy", "shares": 5_000.0, "price": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("insufficient funds"));
}

#[tokio::test]
async fn non_positive_trade_parameters_return_400() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "erin").await;

    let res = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "AAPL", "side": "buy", "shares": 0.0, "price": 100.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 400);
    let json: serde_json::Value = res.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("invalid trade parameters"));
}

#[tokio::test]
async fn symbols_are_normalized_to_uppercase() {
    let base_url = spawn_app().await;
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &base_url, "frank").await;

    let res = client
        .post(format!("{}/trades", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "symbol": "aapl", "side": "buy", "shares": 1.0, "price": 10.0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    let portfolio: serde_json::Value = client
        .get(format!("{}/portfolio?symbol=AAPL", base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let positions = portfolio["positions"].as_array().unwrap();
    assert_eq!(positions.len(), 1);
    assert_eq!(positions[0]["symbol"].as_str(), Some("AAPL"));
}
