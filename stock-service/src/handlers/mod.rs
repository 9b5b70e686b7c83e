//! HTTP handlers for stock-service.

pub mod health;
pub mod stock;

pub use health::{health_check, readiness_check};
pub use stock::{stock_chart, stock_info};
