use orders_hex::application::order_service::OrderService;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::build_repo;
use orders_types::domain::bulk::{
    BulkDeleteResult, BulkDuplicateResult, BulkStatusResult, OrderStats,
};
use orders_types::domain::order::{Order, OrderStatus};
use orders_types::domain::query::OrderPage;
use serde_json::json;

async fn start_server() -> (String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let config = HttpServerConfig {
        port: port.to_string(),
    };

    let repo = build_repo(None).await.expect("build repo");
    let service = OrderService::new(repo);
    let server = HttpServer::new(service, config).await.unwrap();

    let handle = tokio::spawn(async move {
        server.serve(listener).await.expect("server run");
    });
    (format!("http://127.0.0.1:{}", port), handle)
}

fn order_body(name: &str, status: &str) -> serde_json::Value {
    json!({
        "customer_name": name,
        "order_date": "2024-04-02",
        "status": status,
        "total_amount": 42.5,
        "payment_status": "Paid",
    })
}

#[tokio::test]
async fn create_list_update_delete_over_http() {
    let (addr, handle) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", addr))
        .json(&order_body("HttpUser", "Pending"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: Order = res.json().await.unwrap();
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.order_number, format!("#ORD{}", 1000 + created.id));

    let fetched: Order = client
        .get(format!("{}/orders/{}", addr, created.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched.customer_name, "HttpUser");

    let page: OrderPage = client
        .get(format!("{}/orders?status=Pending&per_page=5", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.per_page, 5);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.orders[0].id, created.id);

    let res = client
        .put(format!("{}/orders/{}", addr, created.id))
        .json(&json!({ "status": "Refunded" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: Order = res.json().await.unwrap();
    assert_eq!(updated.status, OrderStatus::Refunded);
    assert_eq!(updated.customer_name, "HttpUser");

    let res = client
        .delete(format!("{}/orders/{}", addr, created.id))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(res.bytes().await.unwrap().is_empty());

    // stop server task
    handle.abort();
}

#[tokio::test]
async fn bulk_endpoints_and_stats() {
    let (addr, handle) = start_server().await;
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let order: Order = client
            .post(format!("{}/orders", addr))
            .json(&order_body(name, "Pending"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(order.id);
    }

    let updated: BulkStatusResult = client
        .put(format!("{}/orders/bulk/status", addr))
        .json(&json!({ "order_ids": [ids[0], ids[1]], "status": "Completed" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated.updated_count, 2);

    let duplicated: BulkDuplicateResult = client
        .post(format!("{}/orders/bulk/duplicate", addr))
        .json(&json!({ "order_ids": [ids[2]] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(duplicated.duplicated_count, 1);
    assert_eq!(duplicated.new_ids.len(), 1);

    let stats: OrderStats = client
        .get(format!("{}/orders/stats/summary", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.shipped, 2);

    let deleted: BulkDeleteResult = client
        .delete(format!("{}/orders/bulk", addr))
        .json(&json!({ "order_ids": [ids[0], duplicated.new_ids[0]] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(deleted.deleted_count, 2);

    let page: OrderPage = client
        .get(format!("{}/orders", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page.total, 2);

    handle.abort();
}

#[tokio::test]
async fn bad_request_and_not_found_paths() {
    let (addr, handle) = start_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", addr))
        .json(&order_body("", "Pending"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["detail"].as_str().unwrap().contains("customer_name"));

    let res = client
        .get(format!("{}/orders/4242", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Order not found");

    let res = client
        .get(format!("{}/orders?sort_by=price", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .delete(format!("{}/orders/bulk", addr))
        .json(&json!({ "order_ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/health", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    handle.abort();
}
