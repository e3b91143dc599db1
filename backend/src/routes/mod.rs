//! Route definitions for the Solar Performance Monitor

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Alert workflow
        .nest("/alerts", alert_routes())
        // Production reports
        .nest("/reports", report_routes())
}

/// Alert query and management routes
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_alerts))
        .route("/stats", get(handlers::get_alert_stats))
        .route("/acknowledge", post(handlers::acknowledge_alerts))
        .route("/reset", post(handlers::reset_alerts))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new().route("/summary", get(handlers::get_production_summary))
}
