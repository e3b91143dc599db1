//! HTTP request handlers for the Solar Performance Monitor

pub mod alerts;
pub mod health;
pub mod reporting;

pub use alerts::{acknowledge_alerts, get_alert_stats, list_alerts, reset_alerts};
pub use health::health_check;
pub use reporting::get_production_summary;
