//! Performance evaluation core
//!
//! Pure functions turning weather-derived irradiance and metered production
//! into an underperformance verdict. Everything here is side-effect free so
//! the detection rules can be tested without a database or live APIs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fraction of theoretical output a healthy installation is assumed to reach
pub const DEFAULT_PANEL_EFFICIENCY: f64 = 0.80;

/// Performance ratio below which an installation counts as underperforming
pub const DEFAULT_UNDERPERFORMANCE_THRESHOLD: f64 = 0.50;

/// Errors raised by the estimator and the evaluator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PerformanceError {
    #[error("peak power must be positive, got {0} kW")]
    NonPositivePeakPower(f64),

    #[error("irradiance must be a non-negative number, got {0} kWh/m²")]
    InvalidIrradiance(f64),

    #[error("panel efficiency must be within (0, 1], got {0}")]
    EfficiencyOutOfRange(f64),

    #[error("produced energy must be a non-negative number, got {0} kWh")]
    InvalidProduction(f64),

    #[error("expected energy must be a non-negative number, got {0} kWh")]
    InvalidExpected(f64),

    #[error("underperformance threshold must be positive, got {0}")]
    NonPositiveThreshold(f64),
}

/// Tunable detection parameters, loaded from configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PerformanceSettings {
    #[serde(default = "default_efficiency")]
    pub panel_efficiency: f64,

    #[serde(default = "default_threshold")]
    pub underperformance_threshold: f64,
}

fn default_efficiency() -> f64 {
    DEFAULT_PANEL_EFFICIENCY
}

fn default_threshold() -> f64 {
    DEFAULT_UNDERPERFORMANCE_THRESHOLD
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            panel_efficiency: DEFAULT_PANEL_EFFICIENCY,
            underperformance_threshold: DEFAULT_UNDERPERFORMANCE_THRESHOLD,
        }
    }
}

impl PerformanceSettings {
    /// Reject settings the estimator or evaluator would refuse at run time
    pub fn validate(&self) -> Result<(), PerformanceError> {
        if !self.panel_efficiency.is_finite()
            || self.panel_efficiency <= 0.0
            || self.panel_efficiency > 1.0
        {
            return Err(PerformanceError::EfficiencyOutOfRange(self.panel_efficiency));
        }
        if !self.underperformance_threshold.is_finite() || self.underperformance_threshold <= 0.0 {
            return Err(PerformanceError::NonPositiveThreshold(
                self.underperformance_threshold,
            ));
        }
        Ok(())
    }
}

/// Expected daily production in kWh for an installation
///
/// `peak_power_kw * irradiance_kwh_m2 * efficiency`. A zero-irradiance day
/// yields zero expected output, which in turn disables underperformance
/// detection for that day.
pub fn expected_yield(
    peak_power_kw: f64,
    irradiance_kwh_m2: f64,
    efficiency: f64,
) -> Result<f64, PerformanceError> {
    if !peak_power_kw.is_finite() || peak_power_kw <= 0.0 {
        return Err(PerformanceError::NonPositivePeakPower(peak_power_kw));
    }
    if !irradiance_kwh_m2.is_finite() || irradiance_kwh_m2 < 0.0 {
        return Err(PerformanceError::InvalidIrradiance(irradiance_kwh_m2));
    }
    if !efficiency.is_finite() || efficiency <= 0.0 || efficiency > 1.0 {
        return Err(PerformanceError::EfficiencyOutOfRange(efficiency));
    }
    Ok(peak_power_kw * irradiance_kwh_m2 * efficiency)
}

/// Outcome of comparing actual against expected production
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// `actual / expected`, undefined when expected output is zero
    pub performance_ratio: Option<f64>,
    pub is_underperforming: bool,
}

/// Compare actual production against the expected baseline
///
/// The underperformance comparison is strict: a ratio exactly equal to the
/// threshold does not raise an alert. When expected output is zero the
/// ratio is undefined and the installation is never flagged, regardless of
/// the metered value.
pub fn evaluate(
    actual_kwh: f64,
    expected_kwh: f64,
    threshold: f64,
) -> Result<Evaluation, PerformanceError> {
    if !actual_kwh.is_finite() || actual_kwh < 0.0 {
        return Err(PerformanceError::InvalidProduction(actual_kwh));
    }
    if !expected_kwh.is_finite() || expected_kwh < 0.0 {
        return Err(PerformanceError::InvalidExpected(expected_kwh));
    }
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(PerformanceError::NonPositiveThreshold(threshold));
    }

    if expected_kwh == 0.0 {
        return Ok(Evaluation {
            performance_ratio: None,
            is_underperforming: false,
        });
    }

    let ratio = actual_kwh / expected_kwh;
    Ok(Evaluation {
        performance_ratio: Some(ratio),
        is_underperforming: ratio < threshold,
    })
}

/// Full assessment of one day's output for one installation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceAssessment {
    pub expected_kwh: f64,
    pub performance_ratio: Option<f64>,
    pub is_underperforming: bool,
}

/// Estimate expected production and evaluate the metered value against it
pub fn assess(
    actual_kwh: f64,
    peak_power_kw: f64,
    irradiance_kwh_m2: f64,
    settings: &PerformanceSettings,
) -> Result<PerformanceAssessment, PerformanceError> {
    let expected_kwh = expected_yield(
        peak_power_kw,
        irradiance_kwh_m2,
        settings.panel_efficiency,
    )?;
    let evaluation = evaluate(actual_kwh, expected_kwh, settings.underperformance_threshold)?;
    Ok(PerformanceAssessment {
        expected_kwh,
        performance_ratio: evaluation.performance_ratio,
        is_underperforming: evaluation.is_underperforming,
    })
}
