use serde::Deserialize;
use std::env;

use anyhow::Context;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    /// Number of demo orders to generate at startup.
    pub seed_orders: Option<usize>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "8000".into());
        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        let seed_orders = match env::var("SEED_ORDERS") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("SEED_ORDERS must be a count, got {raw:?}"))?,
            ),
            _ => None,
        };
        Ok(Self {
            server_port,
            database_url,
            seed_orders,
        })
    }
}
