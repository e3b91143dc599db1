//! Metering API client for production readings
//!
//! Fetches aggregated daily production per metering point. Authentication
//! goes through the X-API-KEY and X-ENERGY-ID headers.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use shared::models::ProductionReading;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Metering API client
#[derive(Clone)]
pub struct EnergyClient {
    client: Client,
    base_url: String,
    api_key: String,
    energy_id: String,
    obis_code: String,
}

/// Aggregated time series response
#[derive(Debug, Deserialize)]
struct AggregatedSeriesResponse {
    unit: Option<String>,
    #[serde(rename = "aggregatedTimeSeries", default)]
    aggregated_time_series: Vec<AggregatedPoint>,
}

#[derive(Debug, Deserialize)]
struct AggregatedPoint {
    value: f64,
}

impl EnergyClient {
    /// Create a new EnergyClient
    pub fn new(base_url: String, api_key: String, energy_id: String, obis_code: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            api_key,
            energy_id,
            obis_code,
        }
    }

    /// Fetch the accumulated production for one metering point and day
    ///
    /// The whole day is requested as a single Infinite aggregation, so the
    /// response carries exactly one point.
    pub async fn daily_yield(&self, pod_code: &str, date: NaiveDate) -> AppResult<ProductionReading> {
        let obis_encoded = self.obis_code.replace(':', "%3A");
        let url = format!(
            "{}/api/metering-points/{}/time-series/aggregated?obisCode={}\
             &startDate={}&endDate={}&aggregationLevel=Infinite&transformationMode=Accumulation",
            self.base_url, pod_code, obis_encoded, date, date
        );

        tracing::info!("Fetching production for POD {} on {}", pod_code, date);

        let response = self
            .client
            .get(&url)
            .header("X-API-KEY", &self.api_key)
            .header("X-ENERGY-ID", &self.energy_id)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable {
                service: "Metering API".to_string(),
                detail: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SourceUnavailable {
                service: "Metering API".to_string(),
                detail: format!("{} - {}", status, body),
            });
        }

        let data: AggregatedSeriesResponse = response.json().await.map_err(|e| {
            AppError::SourceUnavailable {
                service: "Metering API".to_string(),
                detail: format!("failed to parse response: {}", e),
            }
        })?;

        Self::into_reading(pod_code, date, data)
    }

    /// Take the single aggregation point out of the response
    fn into_reading(
        pod_code: &str,
        date: NaiveDate,
        data: AggregatedSeriesResponse,
    ) -> AppResult<ProductionReading> {
        let point = data.aggregated_time_series.first().ok_or_else(|| {
            AppError::SourceUnavailable {
                service: "Metering API".to_string(),
                detail: format!("empty time series for {} on {}", pod_code, date),
            }
        })?;

        Ok(ProductionReading {
            pod_code: pod_code.to_string(),
            date,
            energy_kwh: point.value,
            unit: data.unit.unwrap_or_else(|| "kWh".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()
    }

    #[test]
    fn test_into_reading_takes_first_point() {
        let data = AggregatedSeriesResponse {
            unit: Some("kWh".to_string()),
            aggregated_time_series: vec![AggregatedPoint { value: 12.34 }],
        };

        let reading = EnergyClient::into_reading("LU-0001", date(), data).unwrap();
        assert_eq!(reading.energy_kwh, 12.34);
        assert_eq!(reading.unit, "kWh");
        assert_eq!(reading.pod_code, "LU-0001");
    }

    #[test]
    fn test_into_reading_empty_series_is_unavailable() {
        let data = AggregatedSeriesResponse {
            unit: None,
            aggregated_time_series: vec![],
        };
        assert!(EnergyClient::into_reading("LU-0001", date(), data).is_err());
    }

    #[test]
    fn test_into_reading_defaults_unit() {
        let data = AggregatedSeriesResponse {
            unit: None,
            aggregated_time_series: vec![AggregatedPoint { value: 0.0 }],
        };
        let reading = EnergyClient::into_reading("LU-0001", date(), data).unwrap();
        assert_eq!(reading.unit, "kWh");
    }
}
