use std::cmp::Ordering;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use dashmap::DashMap;
use orders_types::domain::bulk::OrderStats;
use orders_types::domain::order::{NewOrder, Order, OrderId, OrderPatch, OrderStatus};
use orders_types::domain::query::{PageRequest, SortField, SortOrder};
use orders_types::ports::order_repository::{OrderRepository, RepoError};

#[derive(Clone)]
pub struct InMemoryRepo {
    pub map: Arc<DashMap<OrderId, Order>>,
    next_id: Arc<AtomicI64>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    fn allocate_id(&self) -> OrderId {
        self.next_id.fetch_add(1, AtomicOrdering::SeqCst)
    }
}

impl Default for InMemoryRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn compare(a: &Order, b: &Order, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::OrderNumber => a.order_number.cmp(&b.order_number),
        SortField::CustomerName => a.customer_name.cmp(&b.customer_name),
        SortField::OrderDate => a.order_date.cmp(&b.order_date),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
        SortField::TotalAmount => a.total_amount.total_cmp(&b.total_amount),
        SortField::PaymentStatus => a.payment_status.as_str().cmp(b.payment_status.as_str()),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    }
}

/// Sorts the whole filtered set, ties broken by ascending id so that
/// consecutive pages never overlap.
fn sort_orders(orders: &mut [Order], field: SortField, order: SortOrder) {
    orders.sort_by(|a, b| {
        let primary = match order {
            SortOrder::Asc => compare(a, b, field),
            SortOrder::Desc => compare(b, a, field),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    });
}

#[async_trait]
impl OrderRepository for InMemoryRepo {
    async fn create(&self, draft: NewOrder) -> Result<Order, RepoError> {
        let order = Order::from_draft(self.allocate_id(), draft, Utc::now());
        self.map.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepoError> {
        Ok(self.map.get(&id).map(|r| r.clone()))
    }

    async fn list(&self, request: &PageRequest) -> Result<(Vec<Order>, u64), RepoError> {
        let mut matching: Vec<Order> = self
            .map
            .iter()
            .filter(|kv| request.filter.matches(kv.value()))
            .map(|kv| kv.value().clone())
            .collect();
        let total = matching.len() as u64;
        sort_orders(&mut matching, request.sort_by, request.sort_order);
        let page = matching
            .into_iter()
            .skip(usize::try_from(request.offset()).unwrap_or(usize::MAX))
            .take(request.per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, id: OrderId, patch: OrderPatch) -> Result<Option<Order>, RepoError> {
        if let Some(mut v) = self.map.get_mut(&id) {
            v.apply(&patch);
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepoError> {
        Ok(self.map.remove(&id).is_some())
    }

    async fn bulk_update_status(
        &self,
        ids: &[OrderId],
        status: OrderStatus,
    ) -> Result<u64, RepoError> {
        let mut updated = 0;
        for id in dedup(ids) {
            if let Some(mut v) = self.map.get_mut(&id) {
                v.update_status(status);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn bulk_duplicate(&self, ids: &[OrderId]) -> Result<Vec<OrderId>, RepoError> {
        let mut new_ids = Vec::new();
        for id in dedup(ids) {
            // Clone out before inserting so no shard lock is held across the insert.
            let original = self.map.get(&id).map(|r| r.clone());
            if let Some(original) = original {
                let copy = original.duplicate(self.allocate_id(), Utc::now());
                new_ids.push(copy.id);
                self.map.insert(copy.id, copy);
            }
        }
        Ok(new_ids)
    }

    async fn bulk_delete(&self, ids: &[OrderId]) -> Result<u64, RepoError> {
        Ok(dedup(ids)
            .into_iter()
            .filter(|id| self.map.remove(id).is_some())
            .count() as u64)
    }

    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepoError> {
        let mut stats = OrderStats::default();
        for kv in self.map.iter() {
            let order = kv.value();
            if order.order_date.year() == today.year() && order.order_date.month() == today.month()
            {
                stats.total_this_month += 1;
            }
            match order.status {
                OrderStatus::Pending => stats.pending += 1,
                OrderStatus::Completed => stats.shipped += 1,
                OrderStatus::Refunded => stats.refunded += 1,
            }
        }
        Ok(stats)
    }
}

fn dedup(ids: &[OrderId]) -> Vec<OrderId> {
    let mut seen = std::collections::HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
