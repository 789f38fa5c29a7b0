use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    serve, Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::order_service::OrderService;
use crate::errors::AppError;
use orders_types::domain::bulk::{
    BulkDeleteResult, BulkDuplicateResult, BulkIds, BulkStatusResult, BulkStatusUpdate,
    HealthStatus, OrderStats,
};
use orders_types::domain::order::{NewOrder, Order, OrderId, OrderPatch};
use orders_types::domain::query::{ListQuery, OrderPage};
use orders_types::ports::order_repository::OrderRepository;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
}

#[derive(Clone)]
pub struct HttpServer<R>
where
    R: OrderRepository,
{
    pub service: Arc<OrderService<R>>,
    pub config: HttpServerConfig,
}

type Svc<R> = State<Arc<OrderService<R>>>;

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

fn order_id(path: Result<Path<OrderId>, PathRejection>) -> Result<OrderId, AppError> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

impl<R> HttpServer<R>
where
    R: OrderRepository + Send + Sync + 'static,
{
    pub async fn new(service: OrderService<R>, config: HttpServerConfig) -> anyhow::Result<Self> {
        Ok(Self {
            service: Arc::new(service),
            config,
        })
    }

    pub fn router(&self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        Router::new()
            .route("/health", get(health))
            .route("/orders", get(list_orders::<R>).post(create_order::<R>))
            .route("/orders/stats/summary", get(order_stats::<R>))
            .route("/orders/bulk/status", put(bulk_update_status::<R>))
            .route("/orders/bulk/duplicate", post(bulk_duplicate::<R>))
            .route("/orders/bulk", delete(bulk_delete::<R>))
            .route(
                "/orders/{id}",
                get(get_order::<R>)
                    .put(update_order::<R>)
                    .delete(delete_order::<R>),
            )
            .layer(trace_layer)
            .layer(CorsLayer::permissive())
            .with_state(self.service.clone())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serves on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> anyhow::Result<()> {
        let app = self.router();
        tracing::info!("starting server on {}", listener.local_addr()?);
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

async fn health() -> (StatusCode, Json<HealthStatus>) {
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "ok".into(),
        }),
    )
}

async fn list_orders<R>(
    State(service): Svc<R>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<OrderPage>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    Ok(Json(service.list_orders(&query).await?))
}

async fn create_order<R>(
    State(service): Svc<R>,
    payload: Result<Json<NewOrder>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let order = service.create_order(json_body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order<R>(
    State(service): Svc<R>,
    id: Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(service.get_order(order_id(id)?).await?))
}

async fn update_order<R>(
    State(service): Svc<R>,
    id: Result<Path<OrderId>, PathRejection>,
    payload: Result<Json<OrderPatch>, JsonRejection>,
) -> Result<Json<Order>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let updated = service
        .update_order(order_id(id)?, json_body(payload)?)
        .await?;
    Ok(Json(updated))
}

async fn delete_order<R>(
    State(service): Svc<R>,
    id: Result<Path<OrderId>, PathRejection>,
) -> Result<StatusCode, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    service.delete_order(order_id(id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_update_status<R>(
    State(service): Svc<R>,
    payload: Result<Json<BulkStatusUpdate>, JsonRejection>,
) -> Result<Json<BulkStatusResult>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let body = json_body(payload)?;
    Ok(Json(
        service
            .bulk_update_status(&body.order_ids, body.status)
            .await?,
    ))
}

async fn bulk_duplicate<R>(
    State(service): Svc<R>,
    payload: Result<Json<BulkIds>, JsonRejection>,
) -> Result<Json<BulkDuplicateResult>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let body = json_body(payload)?;
    Ok(Json(service.bulk_duplicate(&body.order_ids).await?))
}

async fn bulk_delete<R>(
    State(service): Svc<R>,
    payload: Result<Json<BulkIds>, JsonRejection>,
) -> Result<Json<BulkDeleteResult>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    let body = json_body(payload)?;
    Ok(Json(service.bulk_delete(&body.order_ids).await?))
}

async fn order_stats<R>(State(service): Svc<R>) -> Result<Json<OrderStats>, AppError>
where
    R: OrderRepository + Send + Sync + 'static,
{
    Ok(Json(service.stats().await?))
}
