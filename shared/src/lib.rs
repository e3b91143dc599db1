//! Shared types and models for the Solar Performance Monitor
//!
//! This crate contains the domain models, the performance-evaluation core,
//! and validation helpers shared between the server, the collector, and the
//! operator tooling.

pub mod models;
pub mod performance;
pub mod types;
pub mod validation;

pub use models::*;
pub use performance::*;
pub use types::*;
pub use validation::*;
