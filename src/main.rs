use std::time::Duration;

use rust_broker::api::routes::{AppState, app_router};
use rust_broker::config::Config;
use rust_broker::engine::TradePolicy;
use rust_broker::persistence::{create_pool_and_migrate, purge_expired_sessions};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rust_broker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let pool = create_pool_and_migrate(&config.database_url)
        .await
        .expect("database init failed");

    // Hourly sweep of expired sessions; validation ignores them regardless.
    let sweep_pool = pool.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(3600));
        loop {
            interval.tick().await;
            if let Err(e) = purge_expired_sessions(&sweep_pool, chrono::Utc::now()).await {
                warn!("session sweep failed: {e}");
            }
        }
    });

    let state = AppState {
        db: pool,
        policy: TradePolicy {
            enforce_buy_solvency: config.enforce_buy_solvency,
            ..TradePolicy::default()
        },
    };

    let app = app_router(state);
    info!("listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
