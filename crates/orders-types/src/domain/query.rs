use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::order::{Order, OrderId, OrderStatus, PaymentStatus, ValidationError};

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Id,
    OrderNumber,
    CustomerName,
    OrderDate,
    Status,
    TotalAmount,
    PaymentStatus,
    CreatedAt,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Id,
        SortField::OrderNumber,
        SortField::CustomerName,
        SortField::OrderDate,
        SortField::Status,
        SortField::TotalAmount,
        SortField::PaymentStatus,
        SortField::CreatedAt,
    ];

    /// Wire name, which is also the column name in the SQL adapter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::OrderNumber => "order_number",
            SortField::CustomerName => "customer_name",
            SortField::OrderDate => "order_date",
            SortField::Status => "status",
            SortField::TotalAmount => "total_amount",
            SortField::PaymentStatus => "payment_status",
            SortField::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .into_iter()
            .find(|f| f.as_str() == s.trim())
            .ok_or_else(|| ValidationError::UnknownSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Query parameters of `GET /orders`. Every field is optional and only
/// serialized when present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<SortField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl ListQuery {
    /// Query-string pairs for the present fields. A blank search is
    /// treated as absent so no empty marker is ever sent.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            params.push(("per_page", per_page.to_string()));
        }
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(payment) = self.payment_status {
            params.push(("payment_status", payment.as_str().to_string()));
        }
        if let Some(search) = self.search_term() {
            params.push(("search", search.to_string()));
        }
        if let Some(sort_by) = self.sort_by {
            params.push(("sort_by", sort_by.as_str().to_string()));
        }
        if let Some(sort_order) = self.sort_order {
            params.push(("sort_order", sort_order.as_str().to_string()));
        }
        params
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Applies the backend defaults: page 1, 10 per page (at most 100),
    /// newest order date first.
    pub fn normalize(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1).max(1),
            per_page: self
                .per_page
                .unwrap_or(DEFAULT_PER_PAGE)
                .clamp(1, MAX_PER_PAGE),
            filter: OrderFilter {
                status: self.status,
                payment_status: self.payment_status,
                search: self.search_term().map(str::to_string),
            },
            sort_by: self.sort_by.unwrap_or(SortField::OrderDate),
            sort_order: self.sort_order.unwrap_or(SortOrder::Desc),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub search: Option<String>,
}

impl OrderFilter {
    /// Case-insensitive match of the search term against order number and
    /// customer name.
    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }
        if self
            .payment_status
            .is_some_and(|p| p != order.payment_status)
        {
            return false;
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                order.order_number.to_lowercase().contains(&term)
                    || order.customer_name.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

/// A normalized list request as seen by repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    pub filter: OrderFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl PageRequest {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

/// Response of `GET /orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
}

impl OrderPage {
    pub fn new(orders: Vec<Order>, total: u64, request: &PageRequest) -> Self {
        Self {
            orders,
            total,
            page: request.page,
            per_page: request.per_page,
            total_pages: total_pages(total, request.per_page),
        }
    }

    pub fn ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.id).collect()
    }
}

pub fn total_pages(total: u64, per_page: u32) -> u32 {
    if per_page == 0 {
        return 0;
    }
    let pages = total.div_ceil(u64::from(per_page));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
