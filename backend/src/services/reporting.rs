//! Reporting service for production summaries and data export
//! Aggregates evaluated records over a date range for the API and the collector

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use shared::types::DateRange;

use crate::error::{AppError, AppResult};

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    db: PgPool,
}

/// One evaluated day of one installation, as reported
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct DailySummaryRow {
    pub date: NaiveDate,
    pub pod_code: String,
    pub pod_name: String,
    pub actual_kwh: f64,
    pub expected_kwh: f64,
    pub performance_ratio: Option<f64>,
    pub is_underperforming: bool,
    pub earnings: Decimal,
}

/// Aggregate figures over a reporting range
#[derive(Debug, Serialize)]
pub struct SummaryTotals {
    pub total_actual_kwh: f64,
    pub total_expected_kwh: f64,
    pub total_earnings: Decimal,
    pub underperforming_days: i64,
}

impl ReportingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Production summary over an inclusive date range, newest day first
    pub async fn production_summary(&self, range: &DateRange) -> AppResult<Vec<DailySummaryRow>> {
        let rows = sqlx::query_as::<_, DailySummaryRow>(
            r#"
            SELECT date, pod_code, pod_name, actual_kwh, expected_kwh,
                   performance_ratio, is_underperforming, earnings
            FROM production_records
            WHERE date BETWEEN $1 AND $2
            ORDER BY date DESC, pod_name ASC, pod_code ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Totals over the same range
    pub async fn summary_totals(&self, range: &DateRange) -> AppResult<SummaryTotals> {
        let (total_actual_kwh, total_expected_kwh, total_earnings, underperforming_days) =
            sqlx::query_as::<_, (f64, f64, Decimal, i64)>(
                r#"
                SELECT
                    COALESCE(SUM(actual_kwh), 0) AS total_actual_kwh,
                    COALESCE(SUM(expected_kwh), 0) AS total_expected_kwh,
                    COALESCE(SUM(earnings), 0) AS total_earnings,
                    COUNT(*) FILTER (WHERE is_underperforming = TRUE) AS underperforming_days
                FROM production_records
                WHERE date BETWEEN $1 AND $2
                "#,
            )
            .bind(range.start)
            .bind(range.end)
            .fetch_one(&self.db)
            .await?;

        Ok(SummaryTotals {
            total_actual_kwh,
            total_expected_kwh,
            total_earnings,
            underperforming_days,
        })
    }

    /// Export report data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(anyhow::anyhow!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row(date: (i32, u32, u32), pod_code: &str, ratio: Option<f64>) -> DailySummaryRow {
        DailySummaryRow {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            pod_code: pod_code.to_string(),
            pod_name: "Rooftop East".to_string(),
            actual_kwh: 12.5,
            expected_kwh: 25.0,
            performance_ratio: ratio,
            is_underperforming: ratio.map(|r| r < 0.5).unwrap_or(false),
            earnings: Decimal::new(188, 2),
        }
    }

    #[test]
    fn test_export_to_csv_writes_header_and_rows() {
        let rows = vec![
            sample_row((2025, 6, 15), "LU-0001-PV", Some(0.5)),
            sample_row((2025, 6, 14), "LU-0002-PV", None),
        ];

        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "date,pod_code,pod_name,actual_kwh,expected_kwh,performance_ratio,is_underperforming,earnings"
        );
        assert!(csv.contains("2025-06-15,LU-0001-PV"));
        assert!(csv.contains("2025-06-14,LU-0002-PV"));
        assert_eq!(csv.lines().count(), 3);
    }

    #[test]
    fn test_export_to_csv_empty_input() {
        let rows: Vec<DailySummaryRow> = vec![];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        assert!(csv.is_empty());
    }
}
