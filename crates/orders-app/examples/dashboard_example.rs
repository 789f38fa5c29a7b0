///  To run :
///  cargo r --example dashboard_example
use std::sync::Arc;

use chrono::Utc;
use orders_dashboard::view::render_dashboard;
use orders_dashboard::{BulkAction, DashboardConfig, ListController, StatusFilter};
use orders_hex::application::order_service::OrderService;
use orders_hex::application::seed::seed_orders;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::build_repo;
use orders_types::domain::order::OrderStatus;
use orders_types::domain::query::SortField;
use tempfile::tempdir;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Bind first so the dashboard can connect as soon as the server task starts.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    // Use a temp file-backed SQLite DB so multiple connections see the same data.
    let tmp = tempdir()?;
    let db_url = format!("sqlite://{}", tmp.path().join("orders.db").display());

    let repo = build_repo(Some(&db_url)).await?;
    let service = OrderService::new(repo);
    let seeded = seed_orders(&service, 36, Utc::now().date_naive()).await?;
    println!("Seeded {seeded} orders");

    let server = HttpServer::new(
        service,
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await?;
    let handle = tokio::spawn(async move {
        if let Err(err) = server.serve(listener).await {
            eprintln!("server stopped: {err:#}");
        }
    });

    let config = DashboardConfig {
        api_url: format!("http://127.0.0.1:{port}/"),
        ..DashboardConfig::default()
    };
    let ctl = ListController::with_config(Arc::new(config.build_client()?), &config);

    ctl.load().await?;
    println!("{}", render_dashboard(&ctl.snapshot()));

    ctl.set_filter(StatusFilter::Status(OrderStatus::Pending)).await?;
    ctl.set_sort(SortField::TotalAmount).await?;
    println!("{}", render_dashboard(&ctl.snapshot()));

    ctl.select_all();
    let outcome = ctl
        .run_bulk(BulkAction::UpdateStatus(OrderStatus::Completed))
        .await?;
    println!("{}", outcome.summary());
    println!("{}", render_dashboard(&ctl.snapshot()));

    handle.abort();
    Ok(())
}
