//! Solar installation models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::GpsCoordinates;

/// A monitored solar installation
///
/// Installations are static configuration: the monitored fleet is a fixed
/// set of metering points with known nameplate capacity and location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    /// Metering point code (POD), unique per installation
    pub pod_code: String,
    /// Human-readable name shown in notifications and reports
    pub name: String,
    /// Nameplate peak power in kW
    pub peak_power_kw: f64,
    pub coordinates: GpsCoordinates,
    /// Feed-in price per kWh, used for earnings reporting
    pub price_per_kwh: Decimal,
}

impl Installation {
    /// Earnings for a produced amount at this installation's tariff
    pub fn earnings_for(&self, energy_kwh: f64) -> Decimal {
        let produced = Decimal::from_f64_retain(energy_kwh).unwrap_or(Decimal::ZERO);
        (produced * self.price_per_kwh).round_dp(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_installation(price: &str) -> Installation {
        Installation {
            pod_code: "LU-0001".to_string(),
            name: "Test Site".to_string(),
            peak_power_kw: 10.0,
            coordinates: GpsCoordinates::new(
                Decimal::from_str_exact("49.78").unwrap(),
                Decimal::from_str_exact("6.25").unwrap(),
            ),
            price_per_kwh: Decimal::from_str_exact(price).unwrap(),
        }
    }

    #[test]
    fn test_earnings_rounding() {
        let installation = test_installation("0.145");
        assert_eq!(
            installation.earnings_for(10.0),
            Decimal::from_str_exact("1.45").unwrap()
        );
    }

    #[test]
    fn test_earnings_zero_production() {
        let installation = test_installation("0.145");
        assert_eq!(installation.earnings_for(0.0), Decimal::ZERO);
    }
}
