use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Period of the savings recalculation sweep.
    pub recalc_interval: Duration,
    pub recalc_initial_delay: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("NESTEGG_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8088".to_string())
            .parse()
            .context("Invalid NESTEGG_LISTEN_ADDR")?;
        let db_path =
            std::env::var("NESTEGG_DB_PATH").unwrap_or_else(|_| "./db/nestegg.db".into());
        let cors_allow = std::env::var("NESTEGG_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms = env_u64("NESTEGG_REQUEST_TIMEOUT_MS", 30_000);
        let recalc_secs = env_u64("NESTEGG_RECALC_INTERVAL_SECS", 86_400).max(1);
        let delay_secs = env_u64("NESTEGG_RECALC_INITIAL_DELAY_SECS", 30);
        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            recalc_interval: Duration::from_secs(recalc_secs),
            recalc_initial_delay: Duration::from_secs(delay_secs),
        })
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
