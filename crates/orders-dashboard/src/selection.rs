use std::collections::BTreeSet;

use orders_types::domain::order::OrderId;

/// Ids marked for bulk action. Independent of the displayed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<OrderId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether `id` is selected afterwards.
    pub fn toggle(&mut self, id: OrderId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    /// Clears everything when every visible id is already selected,
    /// otherwise selects exactly the visible ids.
    pub fn select_all(&mut self, visible: &[OrderId]) {
        if self.all_selected(visible) {
            self.ids.clear();
        } else {
            self.ids = visible.iter().copied().collect();
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Keeps only ids present in `existing`. Returns how many were dropped.
    pub fn prune(&mut self, existing: &[OrderId]) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| existing.contains(id));
        before - self.ids.len()
    }

    pub fn remove(&mut self, ids: &[OrderId]) {
        for id in ids {
            self.ids.remove(id);
        }
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.ids.contains(&id)
    }

    pub fn all_selected(&self, visible: &[OrderId]) -> bool {
        visible.iter().all(|id| self.ids.contains(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<OrderId> {
        self.ids.iter().copied().collect()
    }
}
