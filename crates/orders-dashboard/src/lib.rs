pub mod bulk;
pub mod config;
pub mod controller;
pub mod error;
pub mod selection;
pub mod view;

pub use bulk::{BulkAction, BulkOutcome, BulkPhase};
pub use config::DashboardConfig;
pub use controller::{FetchOutcome, ListController, ListView, Notice, NoticeLevel, StatusFilter};
pub use error::ControllerError;
pub use selection::Selection;
