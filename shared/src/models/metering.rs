//! Metering data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated daily production reading for a metering point
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductionReading {
    pub pod_code: String,
    pub date: NaiveDate,
    /// Produced energy in kWh over the whole day
    pub energy_kwh: f64,
    /// Measurement unit reported by the metering API
    pub unit: String,
}
