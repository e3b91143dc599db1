//! Weather archive API client
//!
//! Fetches daily sunshine duration and shortwave radiation from the
//! Open-Meteo historical archive. No API key required.

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use shared::models::WeatherObservation;
use shared::types::GpsCoordinates;

/// 1 MJ/m² expressed in kWh/m²
const MJ_TO_KWH: f64 = 0.2778;

const SECONDS_PER_HOUR: f64 = 3600.0;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Weather archive API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    timezone: String,
}

/// Open-Meteo archive response
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<DailyBlock>,
}

/// Daily aggregates, one entry per requested day
#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    sunshine_duration: Vec<Option<f64>>,
    #[serde(default)]
    shortwave_radiation_sum: Vec<Option<f64>>,
}

impl WeatherClient {
    /// Create a new WeatherClient
    pub fn new(base_url: String, timezone: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            timezone,
        }
    }

    /// Fetch the daily observation for a location and date
    ///
    /// Sunshine duration arrives in seconds and radiation in MJ/m²; both
    /// are converted to the units the estimator works in.
    pub async fn daily_observation(
        &self,
        location: &GpsCoordinates,
        date: NaiveDate,
    ) -> AppResult<WeatherObservation> {
        let url = format!(
            "{}/archive?latitude={}&longitude={}&start_date={}&end_date={}\
             &daily=sunshine_duration,shortwave_radiation_sum&timezone={}",
            self.base_url, location.latitude, location.longitude, date, date, self.timezone
        );

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::SourceUnavailable {
                service: "Weather API".to_string(),
                detail: format!("request failed: {}", e),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::SourceUnavailable {
                service: "Weather API".to_string(),
                detail: format!("{} - {}", status, body),
            });
        }

        let data: ArchiveResponse = response.json().await.map_err(|e| {
            AppError::SourceUnavailable {
                service: "Weather API".to_string(),
                detail: format!("failed to parse response: {}", e),
            }
        })?;

        let observation = Self::convert_daily(location, date, data)?;
        tracing::info!(
            "Weather for {} {} on {}: {}",
            location.latitude,
            location.longitude,
            date,
            observation.describe()
        );
        Ok(observation)
    }

    /// Convert the archive daily block to an observation
    ///
    /// Null aggregate values count as zero (the archive reports null for
    /// sunless days); an absent or empty daily block means the archive has
    /// no data for that date yet.
    fn convert_daily(
        location: &GpsCoordinates,
        date: NaiveDate,
        data: ArchiveResponse,
    ) -> AppResult<WeatherObservation> {
        let no_data = || AppError::SourceUnavailable {
            service: "Weather API".to_string(),
            detail: format!("no daily data for {}", date),
        };

        let daily = data.daily.ok_or_else(no_data)?;
        let sun_seconds = daily
            .sunshine_duration
            .first()
            .ok_or_else(no_data)?
            .unwrap_or(0.0);
        let radiation_mj = daily
            .shortwave_radiation_sum
            .first()
            .ok_or_else(no_data)?
            .unwrap_or(0.0);

        Ok(WeatherObservation {
            location: location.clone(),
            date,
            sun_hours: sun_seconds / SECONDS_PER_HOUR,
            irradiance_kwh_m2: radiation_mj * MJ_TO_KWH,
        })
    }
}
