use std::env;
use std::time::Duration;

use anyhow::Context;
use orders_client::OrdersClient;
use orders_types::domain::query::{DEFAULT_PER_PAGE, MAX_PER_PAGE};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub api_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    /// Zero disables debouncing of search input.
    pub search_debounce: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PER_PAGE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            search_debounce: Duration::ZERO,
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("ORDERS_API_URL").unwrap_or(defaults.api_url);
        let page_size = match var("ORDERS_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("ORDERS_PAGE_SIZE must be a number, got {raw:?}"))?
                .clamp(1, MAX_PER_PAGE),
            None => defaults.page_size,
        };
        let request_timeout = match var("ORDERS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.trim().parse().with_context(|| {
                format!("ORDERS_REQUEST_TIMEOUT_SECS must be a number, got {raw:?}")
            })?),
            None => defaults.request_timeout,
        };
        let search_debounce = match var("ORDERS_SEARCH_DEBOUNCE_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().with_context(|| {
                format!("ORDERS_SEARCH_DEBOUNCE_MS must be a number, got {raw:?}")
            })?),
            None => defaults.search_debounce,
        };

        Ok(Self {
            api_url,
            page_size,
            request_timeout,
            search_debounce,
        })
    }

    pub fn build_client(&self) -> anyhow::Result<OrdersClient> {
        OrdersClient::builder(&self.api_url)?
            .with_timeout(self.request_timeout)
            .build()
    }
}
