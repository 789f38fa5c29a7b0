//! orders-types: domain model and ports shared by the backend, the client and the dashboard

pub mod domain;
pub mod ports;
