//! Reporting handlers for production summaries and data export

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use shared::types::DateRange;

use crate::error::{AppError, AppResult};
use crate::services::reporting::{DailySummaryRow, ReportingService, SummaryTotals};
use crate::AppState;

#[derive(Deserialize)]
pub struct SummaryQuery {
    pub days: Option<u32>,
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub days: u32,
    pub totals: SummaryTotals,
    pub rows: Vec<DailySummaryRow>,
}

/// Get the production summary for the trailing N days
pub async fn get_production_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> AppResult<impl IntoResponse> {
    let days = query.days.unwrap_or(7);
    if days == 0 || days > 365 {
        return Err(AppError::Validation(
            "days must be between 1 and 365".to_string(),
        ));
    }

    let today = chrono::Local::now().date_naive();
    let range = DateRange::trailing_days(today, days);
    let service = ReportingService::new(state.db.clone());
    let rows = service.production_summary(&range).await?;

    if query.format.as_deref() == Some("csv") {
        let csv = ReportingService::export_to_csv(&rows)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"production_summary.csv\"",
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        let totals = service.summary_totals(&range).await?;
        Ok(Json(SummaryResponse { days, totals, rows }).into_response())
    }
}
