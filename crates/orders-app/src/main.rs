use chrono::Utc;
use orders_hex::application::order_service::OrderService;
use orders_hex::application::seed::seed_orders;
use orders_hex::config::Config;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::{build_repo, Repo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / SEED_ORDERS when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let config = Config::from_env()?;
    let repo: Repo = build_repo(config.database_url.as_deref()).await?;
    tracing::info!(repo = repo.kind(), port = %config.server_port, "starting orders api");
    let service = OrderService::new(repo);

    if let Some(count) = config.seed_orders.filter(|n| *n > 0) {
        seed_orders(&service, count, Utc::now().date_naive()).await?;
    }

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(service, server_cfg).await?;
    http.run().await
}
