#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use orders_client::{ClientError, OrdersApi, OrdersClient};
use orders_hex::application::order_service::OrderService;
use orders_hex::inbound::http::{HttpServer, HttpServerConfig};
use orders_repo::build_repo;
use orders_types::domain::bulk::{
    BulkDeleteResult, BulkDuplicateResult, BulkStatusResult, HealthStatus, OrderStats,
};
use orders_types::domain::order::{
    NewOrder, Order, OrderId, OrderPatch, OrderStatus, PaymentStatus,
};
use orders_types::domain::query::{ListQuery, OrderPage};
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Parks a fake call until the test releases it.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

pub fn order(id: OrderId, status: OrderStatus) -> Order {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    Order {
        id,
        order_number: format!("#ORD{}", 1000 + id),
        customer_name: format!("Customer {id}"),
        customer_avatar: None,
        order_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        status,
        total_amount: 10.0 * id as f64,
        payment_status: PaymentStatus::Paid,
        created_at: at,
        updated_at: at,
    }
}

/// Statuses cycling Pending, Completed, Refunded.
pub fn mixed(count: usize) -> Vec<OrderStatus> {
    (0..count).map(|i| OrderStatus::ALL[i % 3]).collect()
}

/// In-memory `OrdersApi` that keeps ids in insertion order and can hold or
/// fail calls on demand.
#[derive(Default)]
pub struct FakeApi {
    orders: Mutex<Vec<Order>>,
    page_gates: Mutex<HashMap<u32, Arc<Gate>>>,
    bulk_gate: Mutex<Option<Arc<Gate>>>,
    last_query: Mutex<Option<ListQuery>>,
    pub fail_lists: AtomicBool,
    pub fail_mutations: AtomicBool,
    list_calls: AtomicUsize,
    mutation_calls: AtomicUsize,
}

impl FakeApi {
    pub fn with_orders(statuses: &[OrderStatus]) -> Self {
        let orders = statuses
            .iter()
            .enumerate()
            .map(|(i, status)| order(i as OrderId + 1, *status))
            .collect();
        Self {
            orders: Mutex::new(orders),
            ..Self::default()
        }
    }

    /// The next list request for `page` waits on the returned gate.
    pub fn hold_page(&self, page: u32) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.page_gates.lock().insert(page, gate.clone());
        gate
    }

    /// The next bulk request waits on the returned gate.
    pub fn hold_bulk(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *self.bulk_gate.lock() = Some(gate.clone());
        gate
    }

    pub fn set_failing_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    pub fn set_failing_mutations(&self, fail: bool) {
        self.fail_mutations.store(fail, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn mutation_calls(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<ListQuery> {
        self.last_query.lock().clone()
    }

    /// Removes an order behind the controller's back.
    pub fn remove(&self, id: OrderId) {
        self.orders.lock().retain(|o| o.id != id);
    }

    pub fn status_of(&self, id: OrderId) -> Option<OrderStatus> {
        self.orders
            .lock()
            .iter()
            .find(|o| o.id == id)
            .map(|o| o.status)
    }

    fn outage() -> ClientError {
        ClientError::Request {
            status: 503,
            message: "Service Unavailable".into(),
        }
    }

    fn not_found() -> ClientError {
        ClientError::Request {
            status: 404,
            message: "Order not found".into(),
        }
    }

    fn begin_mutation(&self) -> Result<(), ClientError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }
        Ok(())
    }

    async fn wait_bulk_gate(&self) {
        let gate = self.bulk_gate.lock().take();
        if let Some(gate) = gate {
            gate.pass().await;
        }
    }

    fn next_id(orders: &[Order]) -> OrderId {
        orders.iter().map(|o| o.id).max().unwrap_or(0) + 1
    }
}

#[async_trait]
impl OrdersApi for FakeApi {
    async fn list_orders(&self, query: &ListQuery) -> Result<OrderPage, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(query.clone());
        let gate = self.page_gates.lock().remove(&query.page.unwrap_or(1));
        if let Some(gate) = gate {
            gate.pass().await;
        }
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::outage());
        }

        let request = query.normalize();
        let matching: Vec<Order> = self
            .orders
            .lock()
            .iter()
            .filter(|o| request.filter.matches(o))
            .cloned()
            .collect();
        let total = matching.len() as u64;
        let rows = matching
            .into_iter()
            .skip(request.offset() as usize)
            .take(request.per_page as usize)
            .collect();
        Ok(OrderPage::new(rows, total, &request))
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        self.orders
            .lock()
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_order(&self, draft: &NewOrder) -> Result<Order, ClientError> {
        self.begin_mutation()?;
        let mut orders = self.orders.lock();
        let created = Order::from_draft(Self::next_id(&orders), draft.clone(), Utc::now());
        orders.push(created.clone());
        Ok(created)
    }

    async fn update_order(&self, id: OrderId, patch: &OrderPatch) -> Result<Order, ClientError> {
        self.begin_mutation()?;
        let mut orders = self.orders.lock();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(Self::not_found)?;
        order.apply(patch);
        Ok(order.clone())
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), ClientError> {
        self.begin_mutation()?;
        let mut orders = self.orders.lock();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<BulkStatusResult, ClientError> {
        self.wait_bulk_gate().await;
        self.begin_mutation()?;
        let mut updated_count = 0;
        for order in self.orders.lock().iter_mut() {
            if ids.contains(&order.id) {
                order.update_status(status);
                updated_count += 1;
            }
        }
        Ok(BulkStatusResult {
            message: String::new(),
            updated_count,
        })
    }

    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<BulkDuplicateResult, ClientError> {
        self.wait_bulk_gate().await;
        self.begin_mutation()?;
        let mut orders = self.orders.lock();
        let sources: Vec<Order> = orders
            .iter()
            .filter(|o| ids.contains(&o.id))
            .cloned()
            .collect();
        let mut new_ids = Vec::new();
        for source in sources {
            let copy = source.duplicate(Self::next_id(&orders), Utc::now());
            new_ids.push(copy.id);
            orders.push(copy);
        }
        Ok(BulkDuplicateResult {
            message: String::new(),
            duplicated_count: new_ids.len() as u64,
            new_ids,
        })
    }

    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<BulkDeleteResult, ClientError> {
        self.wait_bulk_gate().await;
        self.begin_mutation()?;
        let mut orders = self.orders.lock();
        let before = orders.len();
        orders.retain(|o| !ids.contains(&o.id));
        Ok(BulkDeleteResult {
            message: String::new(),
            deleted_count: (before - orders.len()) as u64,
        })
    }

    async fn stats(&self) -> Result<OrderStats, ClientError> {
        let orders = self.orders.lock();
        let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count() as u64;
        Ok(OrderStats {
            total_this_month: orders.len() as u64,
            pending: count(OrderStatus::Pending),
            shipped: count(OrderStatus::Completed),
            refunded: count(OrderStatus::Refunded),
        })
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(HealthStatus {
            status: "ok".into(),
        })
    }
}

/// Starts the real backend on an ephemeral port with an in-memory repository.
pub async fn start_backend() -> (OrdersClient, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let repo = build_repo(None).await.expect("build repo");
    let server = HttpServer::new(
        OrderService::new(repo),
        HttpServerConfig {
            port: port.to_string(),
        },
    )
    .await
    .unwrap();
    let handle = tokio::spawn(async move {
        server.serve(listener).await.expect("server run");
    });
    let client = OrdersClient::new(&format!("http://127.0.0.1:{port}/")).unwrap();
    (client, handle)
}

pub fn draft(name: &str, status: OrderStatus, amount: f64) -> NewOrder {
    NewOrder {
        customer_name: name.into(),
        customer_avatar: None,
        order_date: Utc::now().date_naive(),
        status,
        total_amount: amount,
        payment_status: PaymentStatus::Unpaid,
    }
}
