//! Environment-backed configuration.

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub enforce_buy_solvency: bool,
}

impl Config {
    /// Read from the environment, with defaults suitable for a local run.
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://broker.db".to_string());
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let enforce_buy_solvency = std::env::var("ENFORCE_BUY_SOLVENCY")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Self {
            database_url,
            bind_addr,
            enforce_buy_solvency,
        }
    }
}
