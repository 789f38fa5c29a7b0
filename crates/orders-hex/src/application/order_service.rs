use crate::errors::AppError;
use chrono::{NaiveDate, Utc};
use orders_types::domain::bulk::{
    validate_ids, BulkDeleteResult, BulkDuplicateResult, BulkStatusResult, OrderStats,
};
use orders_types::domain::order::{NewOrder, Order, OrderId, OrderPatch, OrderStatus};
use orders_types::domain::query::{ListQuery, OrderPage};
use orders_types::ports::order_repository::OrderRepository;

pub struct OrderService<R: OrderRepository> {
    repo: R,
}

fn not_found() -> AppError {
    AppError::NotFound("Order not found".into())
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub async fn create_order(&self, draft: NewOrder) -> Result<Order, AppError> {
        draft.validate()?;
        let order = self.repo.create(draft).await?;
        tracing::debug!(id = order.id, number = %order.order_number, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: OrderId) -> Result<Order, AppError> {
        self.repo.get(id).await?.ok_or_else(not_found)
    }

    pub async fn list_orders(&self, query: &ListQuery) -> Result<OrderPage, AppError> {
        let request = query.normalize();
        let (orders, total) = self.repo.list(&request).await?;
        Ok(OrderPage::new(orders, total, &request))
    }

    pub async fn update_order(&self, id: OrderId, patch: OrderPatch) -> Result<Order, AppError> {
        patch.validate()?;
        self.repo.update(id, patch).await?.ok_or_else(not_found)
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<(), AppError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    pub async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<BulkStatusResult, AppError> {
        validate_ids(ids)?;
        let updated_count = self.repo.bulk_update_status(ids, status).await?;
        Ok(BulkStatusResult {
            message: format!("Successfully updated {updated_count} orders"),
            updated_count,
        })
    }

    pub async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<BulkDuplicateResult, AppError> {
        validate_ids(ids)?;
        let new_ids = self.repo.bulk_duplicate(ids).await?;
        if new_ids.is_empty() {
            return Err(AppError::NotFound("No orders found to duplicate".into()));
        }
        let duplicated_count = new_ids.len() as u64;
        Ok(BulkDuplicateResult {
            message: format!("Successfully duplicated {duplicated_count} orders"),
            duplicated_count,
            new_ids,
        })
    }

    pub async fn bulk_delete(&self, ids: &[OrderId]) -> Result<BulkDeleteResult, AppError> {
        validate_ids(ids)?;
        let deleted_count = self.repo.bulk_delete(ids).await?;
        Ok(BulkDeleteResult {
            message: format!("Successfully deleted {deleted_count} orders"),
            deleted_count,
        })
    }

    pub async fn stats(&self) -> Result<OrderStats, AppError> {
        self.stats_on(Utc::now().date_naive()).await
    }

    pub async fn stats_on(&self, today: NaiveDate) -> Result<OrderStats, AppError> {
        Ok(self.repo.stats(today).await?)
    }
}
