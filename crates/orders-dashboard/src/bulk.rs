use orders_types::domain::order::{OrderId, OrderStatus, ValidationError};

use crate::error::ControllerError;
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkPhase {
    /// Nothing selected; the bar is hidden.
    Idle,
    Selected,
    /// A bulk request is in flight; every action is disabled.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    UpdateStatus(OrderStatus),
    Duplicate,
    Delete,
}

impl BulkAction {
    /// Every action the bar offers, in display order.
    pub fn all() -> Vec<BulkAction> {
        OrderStatus::ALL
            .into_iter()
            .map(BulkAction::UpdateStatus)
            .chain([BulkAction::Duplicate, BulkAction::Delete])
            .collect()
    }

    pub fn label(&self) -> String {
        match self {
            BulkAction::UpdateStatus(status) => format!("Mark {status}"),
            BulkAction::Duplicate => "Duplicate".to_string(),
            BulkAction::Delete => "Delete".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Updated { count: u64 },
    Duplicated { count: u64, new_ids: Vec<OrderId> },
    Deleted { count: u64 },
}

impl BulkOutcome {
    /// Affected rows as reported by the server.
    pub fn count(&self) -> u64 {
        match self {
            BulkOutcome::Updated { count }
            | BulkOutcome::Duplicated { count, .. }
            | BulkOutcome::Deleted { count } => *count,
        }
    }

    pub fn summary(&self) -> String {
        let (verb, count) = match self {
            BulkOutcome::Updated { count } => ("Updated", *count),
            BulkOutcome::Duplicated { count, .. } => ("Duplicated", *count),
            BulkOutcome::Deleted { count } => ("Deleted", *count),
        };
        let noun = if count == 1 { "order" } else { "orders" };
        format!("{verb} {count} {noun}")
    }
}

/// In-flight guard of the bulk action bar.
#[derive(Debug, Clone, Default)]
pub struct BulkFlow {
    pending: bool,
}

impl BulkFlow {
    pub fn phase(&self, selection: &Selection) -> BulkPhase {
        if self.pending {
            BulkPhase::Pending
        } else if selection.is_empty() {
            BulkPhase::Idle
        } else {
            BulkPhase::Selected
        }
    }

    /// Moves `Selected` to `Pending` and hands back the ids to submit.
    pub fn begin(&mut self, selection: &Selection) -> Result<Vec<OrderId>, ControllerError> {
        match self.phase(selection) {
            BulkPhase::Pending => Err(ControllerError::BulkActionPending),
            BulkPhase::Idle => Err(ValidationError::EmptySelection.into()),
            BulkPhase::Selected => {
                self.pending = true;
                Ok(selection.ids())
            }
        }
    }

    pub fn finish(&mut self) {
        self.pending = false;
    }
}
