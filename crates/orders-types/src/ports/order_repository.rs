use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::bulk::OrderStats;
use crate::domain::order::{NewOrder, Order, OrderId, OrderPatch, OrderStatus};
use crate::domain::query::PageRequest;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),
}

#[async_trait]
pub trait OrderRepository: Send + Sync + 'static {
    async fn create(&self, draft: NewOrder) -> Result<Order, RepoError>;
    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError>;
    /// One page of the filtered, sorted collection plus the filtered total.
    async fn list(&self, request: &PageRequest) -> Result<(Vec<Order>, u64), RepoError>;
    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>, RepoError>;
    async fn delete(&self, id: OrderId) -> Result<bool, RepoError>;
    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<u64, RepoError>;
    /// Returns the ids of the copies, in the order of the originals.
    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<Vec<OrderId>, RepoError>;
    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<u64, RepoError>;
    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepoError>;
}
