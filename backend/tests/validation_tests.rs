//! Installation configuration validation tests
//!
//! The monitored fleet is static configuration, validated once at startup.
//! These tests pin down what the loader accepts and rejects.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::models::Installation;
use shared::types::GpsCoordinates;
use shared::validation::{
    validate_coordinates, validate_email, validate_installation, validate_peak_power,
    validate_pod_code, validate_price_per_kwh,
};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sample_installation() -> Installation {
    Installation {
        pod_code: "LU-0001-PV".to_string(),
        name: "Rooftop East".to_string(),
        peak_power_kw: 10.2,
        coordinates: GpsCoordinates::new(dec("49.6116"), dec("6.1319")),
        price_per_kwh: dec("0.15"),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_pod_code_accepts_metering_point_format() {
        assert!(validate_pod_code("LU-0001-PV").is_ok());
        assert!(validate_pod_code("LU0000012345").is_ok());
        assert!(validate_pod_code("ABCD").is_ok());
    }

    #[test]
    fn test_pod_code_rejects_bad_lengths() {
        assert!(validate_pod_code("AB1").is_err());
        assert!(validate_pod_code(&"A".repeat(41)).is_err());
    }

    #[test]
    fn test_pod_code_rejects_bad_characters() {
        assert!(validate_pod_code("lu-0001-pv").is_err());
        assert!(validate_pod_code("LU_0001").is_err());
        assert!(validate_pod_code("LU 0001").is_err());
    }

    #[test]
    fn test_peak_power_bounds() {
        assert!(validate_peak_power(10.2).is_ok());
        assert!(validate_peak_power(0.0).is_err());
        assert!(validate_peak_power(-5.0).is_err());
        assert!(validate_peak_power(f64::NAN).is_err());
        assert!(validate_peak_power(20_000.0).is_err());
    }

    #[test]
    fn test_price_cannot_be_negative() {
        assert!(validate_price_per_kwh(dec("0.15")).is_ok());
        assert!(validate_price_per_kwh(Decimal::ZERO).is_ok());
        assert!(validate_price_per_kwh(dec("-0.01")).is_err());
    }

    #[test]
    fn test_coordinates_on_the_globe() {
        assert!(validate_coordinates(dec("49.6116"), dec("6.1319")).is_ok());
        assert!(validate_coordinates(dec("90"), dec("180")).is_ok());
        assert!(validate_coordinates(dec("-90"), dec("-180")).is_ok());
        assert!(validate_coordinates(dec("90.1"), dec("0")).is_err());
        assert!(validate_coordinates(dec("0"), dec("180.1")).is_err());
    }

    #[test]
    fn test_installation_composite_validation() {
        assert!(validate_installation(&sample_installation()).is_ok());

        let mut blank_name = sample_installation();
        blank_name.name = "   ".to_string();
        assert!(validate_installation(&blank_name).is_err());

        let mut bad_pod = sample_installation();
        bad_pod.pod_code = "x".to_string();
        assert!(validate_installation(&bad_pod).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("operations@example.com").is_ok());
        assert!(validate_email("bogus").is_err());
        assert!(validate_email("a@b").is_err());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for well-formed POD codes
    fn pod_code_strategy() -> impl Strategy<Value = String> {
        "[A-Z0-9-]{4,40}"
    }

    /// Strategy for latitudes on the globe
    fn latitude_strategy() -> impl Strategy<Value = Decimal> {
        (-900i64..=900i64).prop_map(|n| Decimal::new(n, 1))
    }

    /// Strategy for longitudes on the globe
    fn longitude_strategy() -> impl Strategy<Value = Decimal> {
        (-1800i64..=1800i64).prop_map(|n| Decimal::new(n, 1))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Every well-formed POD code passes
        #[test]
        fn prop_valid_pod_codes_accepted(code in pod_code_strategy()) {
            prop_assert!(validate_pod_code(&code).is_ok());
        }

        /// Lowercase codes never pass
        #[test]
        fn prop_lowercase_pod_codes_rejected(code in "[a-z]{4,20}") {
            prop_assert!(validate_pod_code(&code).is_err());
        }

        /// Coordinates inside the valid ranges always pass
        #[test]
        fn prop_globe_coordinates_accepted(
            lat in latitude_strategy(),
            lon in longitude_strategy()
        ) {
            prop_assert!(validate_coordinates(lat, lon).is_ok());
        }

        /// Latitudes beyond the poles never pass
        #[test]
        fn prop_out_of_range_latitude_rejected(excess in 1i64..=1000i64) {
            let above = Decimal::from(90) + Decimal::new(excess, 1);
            let below = Decimal::from(-90) - Decimal::new(excess, 1);
            prop_assert!(validate_coordinates(above, Decimal::ZERO).is_err());
            prop_assert!(validate_coordinates(below, Decimal::ZERO).is_err());
        }

        /// Positive finite peak power up to the cap passes
        #[test]
        fn prop_reasonable_peak_power_accepted(peak in 0.1f64..10_000.0) {
            prop_assert!(validate_peak_power(peak).is_ok());
        }

        /// Zero or negative peak power never passes
        #[test]
        fn prop_non_positive_peak_power_rejected(peak in -10_000.0f64..=0.0) {
            prop_assert!(validate_peak_power(peak).is_err());
        }
    }
}
