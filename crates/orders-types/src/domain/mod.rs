pub mod bulk;
pub mod order;
pub mod query;
