//! Validation utilities for the Solar Performance Monitor
//!
//! Installation attributes come from configuration, so they are validated
//! once at startup rather than on every evaluation.

use rust_decimal::Decimal;

use crate::models::Installation;

// ============================================================================
// Installation Validations
// ============================================================================

/// Validate a metering point code (uppercase alphanumeric with dashes)
pub fn validate_pod_code(code: &str) -> Result<(), &'static str> {
    if code.len() < 4 {
        return Err("POD code must be at least 4 characters");
    }
    if code.len() > 40 {
        return Err("POD code must be at most 40 characters");
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("POD code must be uppercase alphanumeric (dashes allowed)");
    }
    Ok(())
}

/// Validate nameplate peak power
pub fn validate_peak_power(peak_power_kw: f64) -> Result<(), &'static str> {
    if !peak_power_kw.is_finite() || peak_power_kw <= 0.0 {
        return Err("Peak power must be a positive number of kW");
    }
    if peak_power_kw > 10_000.0 {
        return Err("Peak power exceeds supported installation size");
    }
    Ok(())
}

/// Validate a feed-in price
pub fn validate_price_per_kwh(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price per kWh cannot be negative");
    }
    Ok(())
}

/// Validate GPS coordinates are on the globe
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

/// Validate a configured installation end to end
pub fn validate_installation(installation: &Installation) -> Result<(), &'static str> {
    validate_pod_code(&installation.pod_code)?;
    if installation.name.trim().is_empty() {
        return Err("Installation name cannot be empty");
    }
    validate_peak_power(installation.peak_power_kw)?;
    validate_price_per_kwh(installation.price_per_kwh)?;
    validate_coordinates(
        installation.coordinates.latitude,
        installation.coordinates.longitude,
    )?;
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GpsCoordinates;

    fn sample_installation() -> Installation {
        Installation {
            pod_code: "LU-0001-A".to_string(),
            name: "Sample Roof".to_string(),
            peak_power_kw: 9.6,
            coordinates: GpsCoordinates::new(
                Decimal::from_str_exact("49.78").unwrap(),
                Decimal::from_str_exact("6.25").unwrap(),
            ),
            price_per_kwh: Decimal::from_str_exact("0.145").unwrap(),
        }
    }

    // ========================================================================
    // Installation Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_pod_code_valid() {
        assert!(validate_pod_code("LU-0001").is_ok());
        assert!(validate_pod_code("LU0000010496000000000000000001").is_ok());
    }

    #[test]
    fn test_validate_pod_code_invalid() {
        assert!(validate_pod_code("LU").is_err()); // Too short
        assert!(validate_pod_code("lu-0001").is_err()); // Lowercase
        assert!(validate_pod_code("LU_0001").is_err()); // Underscore
        assert!(validate_pod_code(&"X".repeat(41)).is_err()); // Too long
    }

    #[test]
    fn test_validate_peak_power() {
        assert!(validate_peak_power(9.6).is_ok());
        assert!(validate_peak_power(0.0).is_err());
        assert!(validate_peak_power(-5.0).is_err());
        assert!(validate_peak_power(f64::NAN).is_err());
        assert!(validate_peak_power(20_000.0).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price_per_kwh(Decimal::ZERO).is_ok());
        assert!(validate_price_per_kwh(Decimal::from_str_exact("0.145").unwrap()).is_ok());
        assert!(validate_price_per_kwh(Decimal::from(-1)).is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(Decimal::from(49), Decimal::from(6)).is_ok());
        assert!(validate_coordinates(Decimal::from(91), Decimal::from(6)).is_err());
        assert!(validate_coordinates(Decimal::from(49), Decimal::from(181)).is_err());
        assert!(validate_coordinates(Decimal::from(-91), Decimal::from(6)).is_err());
    }

    #[test]
    fn test_validate_installation_valid() {
        assert!(validate_installation(&sample_installation()).is_ok());
    }

    #[test]
    fn test_validate_installation_empty_name() {
        let mut installation = sample_installation();
        installation.name = "  ".to_string();
        assert!(validate_installation(&installation).is_err());
    }

    // ========================================================================
    // General Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("alerts@example.com").is_ok());
        assert!(validate_email("ops.team@energiepark.lu").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
    }
}
