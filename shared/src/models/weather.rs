//! Weather data models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// Daily weather observation for a location
///
/// Produced by the weather collaborator for one (coordinates, date) pair.
/// Irradiance is the daily shortwave radiation sum expressed in kWh/m², the
/// unit the expected-production estimator works in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub location: GpsCoordinates,
    pub date: NaiveDate,
    /// Sunshine duration in hours
    pub sun_hours: f64,
    /// Daily global solar irradiance in kWh/m²
    pub irradiance_kwh_m2: f64,
}

impl WeatherObservation {
    /// Short human-readable description for notifications
    pub fn describe(&self) -> String {
        format!(
            "{:.1}h sun, {:.2} kWh/m²",
            self.sun_hours, self.irradiance_kwh_m2
        )
    }
}
