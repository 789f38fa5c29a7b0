use async_trait::async_trait;
use orders_types::domain::bulk::{
    BulkDeleteResult, BulkDuplicateResult, BulkIds, BulkStatusResult, BulkStatusUpdate,
    HealthStatus, OrderStats,
};
use orders_types::domain::order::{NewOrder, Order, OrderId, OrderPatch, OrderStatus};
use orders_types::domain::query::{ListQuery, OrderPage};
use reqwest::Method;

use crate::error::ClientError;
use crate::{decode, OrdersClient};

/// Remote operations on the orders collection.
#[async_trait]
pub trait OrdersApi: Send + Sync + 'static {
    async fn list_orders(&self, query: &ListQuery) -> Result<OrderPage, ClientError>;
    async fn get_order(&self, id: OrderId) -> Result<Order, ClientError>;
    async fn create_order(&self, draft: &NewOrder) -> Result<Order, ClientError>;
    async fn update_order(&self, id: OrderId, patch: &OrderPatch) -> Result<Order, ClientError>;
    async fn delete_order(&self, id: OrderId) -> Result<(), ClientError>;
    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<BulkStatusResult, ClientError>;
    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<BulkDuplicateResult, ClientError>;
    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<BulkDeleteResult, ClientError>;
    async fn stats(&self) -> Result<OrderStats, ClientError>;
    async fn health(&self) -> Result<HealthStatus, ClientError>;
}

#[async_trait]
impl OrdersApi for OrdersClient {
    async fn list_orders(&self, query: &ListQuery) -> Result<OrderPage, ClientError> {
        let req = self
            .request(Method::GET, "orders")?
            .query(&query.to_params());
        decode(self.send(req).await?)
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        let req = self.request(Method::GET, &format!("orders/{id}"))?;
        decode(self.send(req).await?)
    }

    async fn create_order(&self, draft: &NewOrder) -> Result<Order, ClientError> {
        let req = self.request(Method::POST, "orders")?.json(draft);
        decode(self.send(req).await?)
    }

    async fn update_order(&self, id: OrderId, patch: &OrderPatch) -> Result<Order, ClientError> {
        let req = self
            .request(Method::PUT, &format!("orders/{id}"))?
            .json(patch);
        decode(self.send(req).await?)
    }

    async fn delete_order(&self, id: OrderId) -> Result<(), ClientError> {
        let req = self.request(Method::DELETE, &format!("orders/{id}"))?;
        self.send(req).await?;
        Ok(())
    }

    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<BulkStatusResult, ClientError> {
        let body = BulkStatusUpdate {
            order_ids: ids.to_vec(),
            status,
        };
        let req = self.request(Method::PUT, "orders/bulk/status")?.json(&body);
        decode(self.send(req).await?)
    }

    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<BulkDuplicateResult, ClientError> {
        let body = BulkIds {
            order_ids: ids.to_vec(),
        };
        let req = self
            .request(Method::POST, "orders/bulk/duplicate")?
            .json(&body);
        decode(self.send(req).await?)
    }

    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<BulkDeleteResult, ClientError> {
        let body = BulkIds {
            order_ids: ids.to_vec(),
        };
        let req = self.request(Method::DELETE, "orders/bulk")?.json(&body);
        match self.send(req).await? {
            // No body to report from, so every requested id counts as deleted.
            None => Ok(BulkDeleteResult {
                message: String::new(),
                deleted_count: ids.len() as u64,
            }),
            body => decode(body),
        }
    }

    async fn stats(&self) -> Result<OrderStats, ClientError> {
        let req = self.request(Method::GET, "orders/stats/summary")?;
        decode(self.send(req).await?)
    }

    async fn health(&self) -> Result<HealthStatus, ClientError> {
        let req = self.request(Method::GET, "health")?;
        decode(self.send(req).await?)
    }
}
