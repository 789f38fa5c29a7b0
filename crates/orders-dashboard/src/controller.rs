use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use orders_client::{ClientError, OrdersApi};
use orders_types::domain::bulk::OrderStats;
use orders_types::domain::order::{NewOrder, Order, OrderId, OrderPatch, OrderStatus};
use orders_types::domain::query::{ListQuery, OrderPage, SortField, SortOrder};
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::bulk::{BulkAction, BulkFlow, BulkOutcome, BulkPhase};
use crate::config::DashboardConfig;
use crate::error::ControllerError;
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Status(OrderStatus),
}

impl StatusFilter {
    pub const TABS: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Status(OrderStatus::Pending),
        StatusFilter::Status(OrderStatus::Completed),
        StatusFilter::Status(OrderStatus::Refunded),
    ];

    pub fn status(&self) -> Option<OrderStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Status(status) => Some(*status),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("All orders"),
            StatusFilter::Status(status) => write!(f, "{status}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    Applied,
    /// A newer request was issued before this one completed; its result was dropped.
    Superseded,
    /// Nothing to fetch, e.g. moving to the page already shown.
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Non-blocking message for the user, replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Snapshot of everything the presentation layer needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub page: u32,
    pub per_page: u32,
    pub filter: StatusFilter,
    pub search: Option<String>,
    pub sort_by: Option<SortField>,
    pub sort_order: SortOrder,
    pub orders: Vec<Order>,
    pub total: u64,
    pub total_pages: u32,
    pub stats: Option<OrderStats>,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<Notice>,
    pub selection: Selection,
    pub bulk: BulkPhase,
}

impl ListView {
    pub fn visible_ids(&self) -> Vec<OrderId> {
        self.orders.iter().map(|o| o.id).collect()
    }
}

struct State {
    page: u32,
    per_page: u32,
    filter: StatusFilter,
    search: Option<String>,
    sort_by: Option<SortField>,
    sort_order: SortOrder,
    current: OrderPage,
    stats: Option<OrderStats>,
    loading: bool,
    error: Option<String>,
    notice: Option<Notice>,
    selection: Selection,
    bulk: BulkFlow,
    fetch_generation: u64,
    stats_generation: u64,
}

impl State {
    fn new(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page,
            filter: StatusFilter::All,
            search: None,
            sort_by: None,
            sort_order: SortOrder::Asc,
            current: OrderPage::default(),
            stats: None,
            loading: false,
            error: None,
            notice: None,
            selection: Selection::new(),
            bulk: BulkFlow::default(),
            fetch_generation: 0,
            stats_generation: 0,
        }
    }

    fn query(&self) -> ListQuery {
        ListQuery {
            page: Some(self.page),
            per_page: Some(self.per_page),
            status: self.filter.status(),
            payment_status: None,
            search: self.search.clone(),
            sort_by: self.sort_by,
            // Without a field the server applies its own default order.
            sort_order: self.sort_by.map(|_| self.sort_order),
        }
    }

    fn apply_page(&mut self, page: OrderPage) {
        let unfiltered = self.filter == StatusFilter::All && self.search.is_none();
        if unfiltered && page.orders.len() as u64 == page.total {
            let dropped = self.selection.prune(&page.ids());
            if dropped > 0 {
                tracing::debug!(dropped, "pruned selection of vanished orders");
            }
        }
        self.page = page.page.max(1);
        self.current = page;
    }

    fn view(&self) -> ListView {
        ListView {
            page: self.page,
            per_page: self.per_page,
            filter: self.filter,
            search: self.search.clone(),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
            orders: self.current.orders.clone(),
            total: self.current.total,
            total_pages: self.current.total_pages,
            stats: self.stats,
            loading: self.loading,
            error: self.error.clone(),
            notice: self.notice.clone(),
            selection: self.selection.clone(),
            bulk: self.bulk.phase(&self.selection),
        }
    }
}

/// Owns paging, filtering, sorting, selection and bulk actions over the
/// remote orders collection. Clones share state.
pub struct ListController<A: OrdersApi> {
    api: Arc<A>,
    state: Arc<Mutex<State>>,
    view_tx: Arc<watch::Sender<ListView>>,
    search_debounce: Duration,
}

impl<A: OrdersApi> Clone for ListController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            state: self.state.clone(),
            view_tx: self.view_tx.clone(),
            search_debounce: self.search_debounce,
        }
    }
}

impl<A: OrdersApi> ListController<A> {
    pub fn new(api: Arc<A>, per_page: u32) -> Self {
        let state = State::new(per_page.max(1));
        let (view_tx, _) = watch::channel(state.view());
        Self {
            api,
            state: Arc::new(Mutex::new(state)),
            view_tx: Arc::new(view_tx),
            search_debounce: Duration::ZERO,
        }
    }

    pub fn with_config(api: Arc<A>, config: &DashboardConfig) -> Self {
        Self::new(api, config.page_size).with_search_debounce(config.search_debounce)
    }

    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        self.search_debounce = delay;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.view_tx.subscribe()
    }

    pub fn snapshot(&self) -> ListView {
        self.state.lock().view()
    }

    /// Parameters the next list request would carry.
    pub fn query(&self) -> ListQuery {
        self.state.lock().query()
    }

    /// Runs `f` under the state lock and publishes the resulting view when it changed.
    fn update<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock();
        let out = f(&mut state);
        let view = state.view();
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
        out
    }

    /// Applies `change` and, when it returns true, issues a list request for
    /// the resulting parameters. Only the latest request may touch state.
    async fn fetch_with(
        &self,
        change: impl FnOnce(&mut State) -> bool,
    ) -> Result<FetchOutcome, ControllerError> {
        let started = self.update(|s| {
            if !change(s) {
                return None;
            }
            s.fetch_generation += 1;
            s.loading = true;
            Some((s.fetch_generation, s.query()))
        });
        let Some((generation, query)) = started else {
            return Ok(FetchOutcome::Skipped);
        };
        self.fetch_started(generation, query).await
    }

    async fn fetch_started(
        &self,
        generation: u64,
        query: ListQuery,
    ) -> Result<FetchOutcome, ControllerError> {
        let mut guard = FetchGuard {
            ctl: self,
            generation,
            settled: false,
        };
        let mut query = query;
        loop {
            let generation = guard.generation;
            tracing::debug!(generation, page = ?query.page, status = ?query.status, "fetching orders");
            let result = self.api.list_orders(&query).await;

            let step = self.update(|s| -> Result<FetchStep, ControllerError> {
                if s.fetch_generation != generation {
                    tracing::debug!(generation, latest = s.fetch_generation, "dropping stale order list response");
                    return Ok(FetchStep::Done(FetchOutcome::Superseded));
                }
                match result {
                    Ok(page) => {
                        // Deletes can leave the index past the end; fetch the last page instead.
                        let last = page.total_pages.max(1);
                        if page.page > last {
                            tracing::debug!(requested = page.page, last, "page index past the end");
                            s.page = last;
                            s.fetch_generation += 1;
                            return Ok(FetchStep::Retry(s.fetch_generation, s.query()));
                        }
                        s.loading = false;
                        s.apply_page(page);
                        s.error = None;
                        Ok(FetchStep::Done(FetchOutcome::Applied))
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to load orders");
                        s.loading = false;
                        // Keep the displayed rows and the index that matches them.
                        if s.current.page > 0 {
                            s.page = s.current.page;
                        }
                        s.error = Some(e.to_string());
                        s.notice = Some(Notice::error(format!("Failed to load orders: {e}")));
                        Err(e.into())
                    }
                }
            });

            match step {
                Ok(FetchStep::Retry(next, next_query)) => {
                    guard.generation = next;
                    query = next_query;
                }
                Ok(FetchStep::Done(outcome)) => {
                    guard.settled = true;
                    return Ok(outcome);
                }
                Err(e) => {
                    guard.settled = true;
                    return Err(e);
                }
            }
        }
    }

    /// Initial fetch of the first page and the stats summary.
    pub async fn load(&self) -> Result<FetchOutcome, ControllerError> {
        let (list, stats) = tokio::join!(self.refresh(), self.refresh_stats());
        let outcome = list?;
        stats?;
        Ok(outcome)
    }

    pub async fn refresh(&self) -> Result<FetchOutcome, ControllerError> {
        self.fetch_with(|_| true).await
    }

    pub async fn set_filter(&self, filter: StatusFilter) -> Result<FetchOutcome, ControllerError> {
        self.fetch_with(|s| {
            s.filter = filter;
            s.page = 1;
            true
        })
        .await
    }

    /// A blank search clears it. With a debounce configured, the request is
    /// only sent if no other parameter change happened during the delay.
    pub async fn set_search(&self, text: &str) -> Result<FetchOutcome, ControllerError> {
        let search = Some(text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if self.search_debounce.is_zero() {
            return self
                .fetch_with(|s| {
                    s.search = search;
                    s.page = 1;
                    true
                })
                .await;
        }

        let generation = self.update(|s| {
            s.search = search;
            s.page = 1;
            s.fetch_generation += 1;
            // Any list request in flight is superseded from here on.
            s.loading = false;
            s.fetch_generation
        });
        tokio::time::sleep(self.search_debounce).await;
        let latest = self.state.lock().fetch_generation;
        if latest != generation {
            return Ok(FetchOutcome::Superseded);
        }
        self.refresh().await
    }

    /// Same field flips the direction; a new field sorts ascending.
    pub async fn set_sort(&self, field: SortField) -> Result<FetchOutcome, ControllerError> {
        self.fetch_with(|s| {
            if s.sort_by == Some(field) {
                s.sort_order = s.sort_order.flipped();
            } else {
                s.sort_by = Some(field);
                s.sort_order = SortOrder::Asc;
            }
            s.page = 1;
            true
        })
        .await
    }

    /// Clamps `page` into the known page range; a no-op when that is the
    /// page already shown.
    pub async fn set_page(&self, page: u32) -> Result<FetchOutcome, ControllerError> {
        self.fetch_with(|s| {
            let last = s.current.total_pages.max(1);
            let target = page.clamp(1, last);
            if target == s.page {
                return false;
            }
            s.page = target;
            true
        })
        .await
    }

    pub async fn next_page(&self) -> Result<FetchOutcome, ControllerError> {
        let page = self.state.lock().page;
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn prev_page(&self) -> Result<FetchOutcome, ControllerError> {
        let page = self.state.lock().page;
        self.set_page(page.saturating_sub(1)).await
    }

    pub async fn refresh_stats(&self) -> Result<FetchOutcome, ControllerError> {
        let generation = {
            let mut s = self.state.lock();
            s.stats_generation += 1;
            s.stats_generation
        };
        let result = self.api.stats().await;
        self.update(|s| -> Result<FetchOutcome, ControllerError> {
            if s.stats_generation != generation {
                return Ok(FetchOutcome::Superseded);
            }
            match result {
                Ok(stats) => {
                    s.stats = Some(stats);
                    Ok(FetchOutcome::Applied)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to load order stats");
                    Err(e.into())
                }
            }
        })
    }

    pub fn toggle(&self, id: OrderId) -> bool {
        self.update(|s| s.selection.toggle(id))
    }

    /// Toggles between selecting exactly the visible rows and selecting nothing.
    pub fn select_all(&self) {
        self.update(|s| {
            let visible = s.current.ids();
            s.selection.select_all(&visible);
        });
    }

    pub fn clear_selection(&self) {
        self.update(|s| s.selection.clear());
    }

    pub fn dismiss_notice(&self) {
        self.update(|s| s.notice = None);
    }

    fn report<T>(&self, action: &str, result: Result<T, ClientError>) -> Result<T, ControllerError> {
        result.map_err(|e| self.failed(action, e))
    }

    fn failed(&self, action: &str, e: ClientError) -> ControllerError {
        tracing::warn!(action, error = %e, "order action failed");
        self.update(|s| s.notice = Some(Notice::error(format!("{action} failed: {e}"))));
        e.into()
    }

    /// Re-fetches the page and stats after a mutation. Failures are already
    /// reflected in state, so they don't fail the mutation itself.
    async fn resync(&self) {
        let (list, stats) = tokio::join!(self.refresh(), self.refresh_stats());
        if let Err(e) = list.and(stats) {
            tracing::debug!(error = %e, "refresh after mutation failed");
        }
    }

    pub async fn add_order(&self, draft: NewOrder) -> Result<Order, ControllerError> {
        draft.validate()?;
        let result = self.api.create_order(&draft).await;
        let order = self.report("Create order", result)?;
        self.update(|s| s.notice = Some(Notice::info(format!("Created {}", order.order_number))));
        self.resync().await;
        Ok(order)
    }

    pub async fn update_order(
        &self,
        id: OrderId,
        patch: OrderPatch,
    ) -> Result<Order, ControllerError> {
        patch.validate()?;
        let result = self.api.update_order(id, &patch).await;
        let order = self.report("Update order", result)?;
        self.resync().await;
        Ok(order)
    }

    /// Status edit from free text input. Blank or unknown text aborts
    /// before any request is made.
    pub async fn edit_status(&self, id: OrderId, status: &str) -> Result<Order, ControllerError> {
        let status: OrderStatus = status.parse()?;
        self.update_order(id, OrderPatch::status(status)).await
    }

    pub async fn delete_order(&self, id: OrderId) -> Result<(), ControllerError> {
        let result = self.api.delete_order(id).await;
        if let Err(e) = &result {
            if e.is_not_found() {
                self.update(|s| s.selection.remove(&[id]));
            }
        }
        self.report("Delete order", result)?;
        self.update(|s| {
            s.selection.remove(&[id]);
            s.notice = Some(Notice::info("Order deleted"));
        });
        self.resync().await;
        Ok(())
    }

    /// Applies `action` to every selected id. Only one bulk action may be in
    /// flight; on failure the selection is kept for a retry.
    pub async fn run_bulk(&self, action: BulkAction) -> Result<BulkOutcome, ControllerError> {
        let ids = self.update(|s| s.bulk.begin(&s.selection))?;
        let guard = BulkGuard {
            ctl: self,
            settled: false,
        };
        tracing::debug!(action = %action.label(), count = ids.len(), "running bulk action");

        let result = match action {
            BulkAction::UpdateStatus(status) => self
                .api
                .bulk_update_status(&ids, status)
                .await
                .map(|r| BulkOutcome::Updated {
                    count: r.updated_count,
                }),
            BulkAction::Duplicate => {
                self.api
                    .bulk_duplicate(&ids)
                    .await
                    .map(|r| BulkOutcome::Duplicated {
                        count: r.duplicated_count,
                        new_ids: r.new_ids,
                    })
            }
            BulkAction::Delete => self
                .api
                .bulk_delete(&ids)
                .await
                .map(|r| BulkOutcome::Deleted {
                    count: r.deleted_count,
                }),
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                guard.settle(|_| {});
                return Err(self.failed(&action.label(), e));
            }
        };

        let notice = Notice::info(outcome.summary());
        if action == BulkAction::Delete {
            guard.settle(|s| {
                s.selection.clear();
                s.notice = Some(notice);
            });
            self.resync().await;
        } else {
            self.resync().await;
            guard.settle(|s| {
                s.selection.clear();
                s.notice = Some(notice);
            });
        }
        Ok(outcome)
    }
}

enum FetchStep {
    Done(FetchOutcome),
    /// The index was clamped; fetch again under the new generation.
    Retry(u64, ListQuery),
}

/// Clears `loading` and restores the displayed page index when a list
/// request is dropped before its response is applied.
struct FetchGuard<'a, A: OrdersApi> {
    ctl: &'a ListController<A>,
    generation: u64,
    settled: bool,
}

impl<A: OrdersApi> Drop for FetchGuard<'_, A> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let generation = self.generation;
        self.ctl.update(|s| {
            if s.fetch_generation != generation {
                return;
            }
            tracing::debug!(generation, "order list request cancelled");
            s.loading = false;
            if s.current.page > 0 {
                s.page = s.current.page;
            }
        });
    }
}

/// Ends the pending bulk phase, including when the action is dropped
/// mid-request.
struct BulkGuard<'a, A: OrdersApi> {
    ctl: &'a ListController<A>,
    settled: bool,
}

impl<A: OrdersApi> BulkGuard<'_, A> {
    fn settle(mut self, f: impl FnOnce(&mut State)) {
        self.settled = true;
        self.ctl.update(|s| {
            f(s);
            s.bulk.finish();
        });
    }
}

impl<A: OrdersApi> Drop for BulkGuard<'_, A> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!("bulk action cancelled");
            self.ctl.update(|s| s.bulk.finish());
        }
    }
}
