use serde::{Deserialize, Serialize};

use super::order::{OrderId, OrderStatus, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkStatusUpdate {
    pub order_ids: Vec<OrderId>,
    pub status: OrderStatus,
}

/// Body of the bulk duplicate and bulk delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkIds {
    pub order_ids: Vec<OrderId>,
}

pub fn validate_ids(ids: &[OrderId]) -> Result<(), ValidationError> {
    if ids.is_empty() {
        return Err(ValidationError::EmptySelection);
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkStatusResult {
    #[serde(default)]
    pub message: String,
    pub updated_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkDuplicateResult {
    #[serde(default)]
    pub message: String,
    pub duplicated_count: u64,
    pub new_ids: Vec<OrderId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkDeleteResult {
    #[serde(default)]
    pub message: String,
    pub deleted_count: u64,
}

/// Response of `GET /orders/stats/summary`. `shipped` counts completed orders.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderStats {
    pub total_this_month: u64,
    pub pending: u64,
    pub shipped: u64,
    pub refunded: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}
