//! Solar Performance Monitor - backend library
//!
//! Shared by the API server, the daily collector, and the operator CLI.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod routes;
pub mod services;

pub use config::Config;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub config: Arc<Config>,
}
