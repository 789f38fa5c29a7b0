//! Plain-text renderers driven by a [`ListView`] snapshot. None of them hold
//! state; each is rebuilt from the latest view.

use std::fmt;

use orders_types::domain::bulk::OrderStats;
use orders_types::domain::order::Order;
use orders_types::domain::query::{SortField, SortOrder};

use crate::bulk::{BulkAction, BulkPhase};
use crate::controller::{ListView, NoticeLevel, StatusFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationStrip {
    pub start: u64,
    pub end: u64,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
}

impl PaginationStrip {
    pub fn from_view(view: &ListView) -> Self {
        let shown = view.orders.len() as u64;
        let start = if shown == 0 {
            0
        } else {
            u64::from(view.page.saturating_sub(1)) * u64::from(view.per_page) + 1
        };
        let end = if shown == 0 { 0 } else { start + shown - 1 };
        Self {
            start,
            end,
            total: view.total,
            page: view.page,
            total_pages: view.total_pages,
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {}\u{2013}{} of {} entries",
            self.start, self.end, self.total
        )
    }

    pub fn page_numbers(&self) -> Vec<u32> {
        (1..=self.total_pages).collect()
    }
}

impl fmt::Display for PaginationStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}  ", self.summary())?;
        f.write_str(if self.has_prev() { "<" } else { " " })?;
        for n in self.page_numbers() {
            if n == self.page {
                write!(f, " [{n}]")?;
            } else {
                write!(f, " {n}")?;
            }
        }
        f.write_str(if self.has_next() { " >" } else { "  " })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterTabs {
    pub active: StatusFilter,
}

impl FilterTabs {
    pub fn from_view(view: &ListView) -> Self {
        Self {
            active: view.filter,
        }
    }
}

impl fmt::Display for FilterTabs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tabs: Vec<String> = StatusFilter::TABS
            .iter()
            .map(|tab| {
                if *tab == self.active {
                    format!("[{tab}]")
                } else {
                    tab.to_string()
                }
            })
            .collect();
        f.write_str(&tabs.join(" | "))
    }
}

/// Table columns in display order, with the field each one sorts by.
pub const COLUMNS: [(&str, SortField); 6] = [
    ("Order", SortField::OrderNumber),
    ("Date", SortField::OrderDate),
    ("Customer", SortField::CustomerName),
    ("Status", SortField::Status),
    ("Total", SortField::TotalAmount),
    ("Payment", SortField::PaymentStatus),
];

pub struct OrdersTable<'a> {
    view: &'a ListView,
}

impl<'a> OrdersTable<'a> {
    pub fn new(view: &'a ListView) -> Self {
        Self { view }
    }

    fn header(&self, name: &str, field: SortField) -> String {
        match (self.view.sort_by, self.view.sort_order) {
            (Some(active), SortOrder::Asc) if active == field => format!("{name} \u{25b2}"),
            (Some(active), SortOrder::Desc) if active == field => format!("{name} \u{25bc}"),
            _ => name.to_string(),
        }
    }

    fn row(&self, order: &Order) -> String {
        let checkbox = if self.view.selection.contains(order.id) {
            "[x]"
        } else {
            "[ ]"
        };
        format!(
            "{checkbox} {:<10} {:<10} {:<20} {:<10} {:>10} {}",
            order.order_number,
            order.order_date.to_string(),
            order.customer_name,
            order.status.as_str(),
            format!("${:.2}", order.total_amount),
            order.payment_status.as_str(),
        )
    }
}

impl fmt::Display for OrdersTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible = self.view.visible_ids();
        let all = !visible.is_empty() && self.view.selection.all_selected(&visible);
        let headers: Vec<String> = COLUMNS
            .iter()
            .map(|(name, field)| self.header(name, *field))
            .collect();
        writeln!(
            f,
            "{} {:<10} {:<10} {:<20} {:<10} {:>10} {}",
            if all { "[x]" } else { "[ ]" },
            headers[0],
            headers[1],
            headers[2],
            headers[3],
            headers[4],
            headers[5],
        )?;
        if self.view.orders.is_empty() {
            return writeln!(f, "    No orders found");
        }
        for order in &self.view.orders {
            writeln!(f, "{}", self.row(order))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsSummary {
    pub stats: Option<OrderStats>,
}

impl fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.stats {
            Some(s) => write!(
                f,
                "This month: {}  Pending: {}  Shipped: {}  Refunded: {}",
                s.total_this_month, s.pending, s.shipped, s.refunded
            ),
            None => f.write_str("Stats unavailable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkActionBar {
    pub selected: usize,
    pub disabled: bool,
    pub actions: Vec<BulkAction>,
}

impl BulkActionBar {
    /// `None` while nothing is selected.
    pub fn from_view(view: &ListView) -> Option<Self> {
        match view.bulk {
            BulkPhase::Idle => None,
            phase => Some(Self {
                selected: view.selection.len(),
                disabled: phase == BulkPhase::Pending,
                actions: BulkAction::all(),
            }),
        }
    }
}

impl fmt::Display for BulkActionBar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} selected", self.selected)?;
        for action in &self.actions {
            if self.disabled {
                write!(f, "  ({})", action.label())?;
            } else {
                write!(f, "  [{}]", action.label())?;
            }
        }
        if self.disabled {
            f.write_str("  working...")?;
        }
        Ok(())
    }
}

pub fn render_dashboard(view: &ListView) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", StatsSummary { stats: view.stats }));
    out.push_str(&format!("{}\n", FilterTabs::from_view(view)));
    if let Some(search) = &view.search {
        out.push_str(&format!("Search: {search}\n"));
    }
    if let Some(notice) = &view.notice {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Error => "error",
        };
        out.push_str(&format!("[{tag}] {}\n", notice.message));
    }
    if view.loading {
        out.push_str("Loading...\n");
    }
    if let Some(bar) = BulkActionBar::from_view(view) {
        out.push_str(&format!("{bar}\n"));
    }
    out.push_str(&OrdersTable::new(view).to_string());
    out.push_str(&format!("{}\n", PaginationStrip::from_view(view)));
    out
}
