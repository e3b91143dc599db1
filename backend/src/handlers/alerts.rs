//! Alert workflow handlers

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use shared::models::AlertStatistics;

use crate::error::AppResult;
use crate::services::alerts::{AlertFilter, AlertSelector, AlertService, ProductionRecord};
use crate::AppState;

/// One alert as returned by the API
#[derive(Debug, Serialize)]
pub struct AlertView {
    pub pod_code: String,
    pub pod_name: String,
    pub date: NaiveDate,
    pub actual_kwh: f64,
    pub expected_kwh: f64,
    pub performance_ratio: Option<f64>,
    pub sun_hours: f64,
    pub irradiance_kwh_m2: f64,
    pub earnings: Decimal,
    pub status: String,
    pub alert_sent: bool,
    pub alert_acknowledged: bool,
}

impl From<ProductionRecord> for AlertView {
    fn from(record: ProductionRecord) -> Self {
        let status = record.alert_state().label().to_string();
        Self {
            pod_code: record.pod_code,
            pod_name: record.pod_name,
            date: record.date,
            actual_kwh: record.actual_kwh,
            expected_kwh: record.expected_kwh,
            performance_ratio: record.performance_ratio,
            sun_hours: record.sun_hours,
            irradiance_kwh_m2: record.irradiance_kwh_m2,
            earnings: record.earnings,
            status,
            alert_sent: record.alert_sent,
            alert_acknowledged: record.alert_acknowledged,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AlertListResponse {
    pub total: usize,
    pub alerts: Vec<AlertView>,
}

/// Outcome of an acknowledge or reset action
#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    pub affected_records: u64,
}

/// List underperformance alerts
pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filter): Query<AlertFilter>,
) -> AppResult<Json<AlertListResponse>> {
    let service = AlertService::new(state.db.clone());
    let records = service.query(&filter).await?;

    Ok(Json(AlertListResponse {
        total: records.len(),
        alerts: records.into_iter().map(AlertView::from).collect(),
    }))
}

/// Get alert workflow counters
pub async fn get_alert_stats(State(state): State<AppState>) -> AppResult<Json<AlertStatistics>> {
    let service = AlertService::new(state.db.clone());
    let stats = service.stats().await?;
    Ok(Json(stats))
}

/// Acknowledge alerts matching the selector
pub async fn acknowledge_alerts(
    State(state): State<AppState>,
    Json(selector): Json<AlertSelector>,
) -> AppResult<Json<ActionResponse>> {
    let service = AlertService::new(state.db.clone());
    let affected = service.acknowledge(&selector).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("Acknowledged {} alert(s)", affected),
        affected_records: affected,
    }))
}

/// Clear alert flags so matching records re-enter the pending pool
pub async fn reset_alerts(
    State(state): State<AppState>,
    Json(selector): Json<AlertSelector>,
) -> AppResult<Json<ActionResponse>> {
    let service = AlertService::new(state.db.clone());
    let affected = service.reset(&selector).await?;

    Ok(Json(ActionResponse {
        success: true,
        message: format!("Reset alert state on {} record(s)", affected),
        affected_records: affected,
    }))
}
