use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type OrderId = i64;

pub const MAX_CUSTOMER_NAME_LEN: usize = 200;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("customer_name must not be empty")]
    EmptyCustomerName,
    #[error("customer_name must be at most 200 characters")]
    CustomerNameTooLong,
    #[error("total_amount must be a positive number, got {0}")]
    InvalidAmount(f64),
    #[error("no fields provided for update")]
    EmptyPatch,
    #[error("status must not be empty")]
    EmptyStatus,
    #[error("unknown order status: {0}")]
    UnknownStatus(String),
    #[error("unknown payment status: {0}")]
    UnknownPaymentStatus(String),
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),
    #[error("order_ids must not be empty")]
    EmptySelection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OrderStatus {
    Pending,
    Completed,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
            OrderStatus::Refunded => "Refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyStatus);
        }
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownStatus(trimmed.to_string()))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Unpaid => "Unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("paid") => Ok(PaymentStatus::Paid),
            v if v.eq_ignore_ascii_case("unpaid") => Ok(PaymentStatus::Unpaid),
            other => Err(ValidationError::UnknownPaymentStatus(other.to_string())),
        }
    }
}

/// A purchase record as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub customer_name: String,
    #[serde(default)]
    pub customer_avatar: Option<String>,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a stored order from a validated draft. The order number is
    /// derived from the id, which is never reused.
    pub fn from_draft(id: OrderId, draft: NewOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_number: order_number_for(id),
            customer_name: draft.customer_name,
            customer_avatar: draft.customer_avatar,
            order_date: draft.order_date,
            status: draft.status,
            total_amount: draft.total_amount,
            payment_status: draft.payment_status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this order under a new id and number, as produced by a bulk duplicate.
    pub fn duplicate(&self, id: OrderId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            order_number: order_number_for(id),
            created_at: now,
            updated_at: now,
            ..self.clone()
        }
    }

    /// The descriptive fields of this order as a creation draft.
    pub fn to_draft(&self) -> NewOrder {
        NewOrder {
            customer_name: self.customer_name.clone(),
            customer_avatar: self.customer_avatar.clone(),
            order_date: self.order_date,
            status: self.status,
            total_amount: self.total_amount,
            payment_status: self.payment_status,
        }
    }

    pub fn apply(&mut self, patch: &OrderPatch) {
        if let Some(name) = &patch.customer_name {
            self.customer_name = name.clone();
        }
        if let Some(avatar) = &patch.customer_avatar {
            self.customer_avatar = Some(avatar.clone());
        }
        if let Some(date) = patch.order_date {
            self.order_date = date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(amount) = patch.total_amount {
            self.total_amount = amount;
        }
        if let Some(payment) = patch.payment_status {
            self.payment_status = payment;
        }
        self.touch();
    }

    pub fn update_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.touch();
    }

    // updated_at never moves backwards even if the wall clock does.
    fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }
}

pub fn order_number_for(id: OrderId) -> String {
    format!("#ORD{}", 1000 + id)
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewOrder {
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_avatar: Option<String>,
    pub order_date: NaiveDate,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_status: PaymentStatus,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_customer_name(&self.customer_name)?;
        validate_amount(self.total_amount)
    }
}

/// Body of `PUT /orders/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl OrderPatch {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.customer_name.is_none()
            && self.customer_avatar.is_none()
            && self.order_date.is_none()
            && self.status.is_none()
            && self.total_amount.is_none()
            && self.payment_status.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyPatch);
        }
        if let Some(name) = &self.customer_name {
            validate_customer_name(name)?;
        }
        if let Some(amount) = self.total_amount {
            validate_amount(amount)?;
        }
        Ok(())
    }
}

fn validate_customer_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyCustomerName);
    }
    if name.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(ValidationError::CustomerNameTooLong);
    }
    Ok(())
}

fn validate_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ValidationError::InvalidAmount(amount));
    }
    Ok(())
}
