//! Alert state store for daily production records
//! Persists evaluation outcomes and drives the pending/sent/acknowledged workflow

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use shared::models::{
    AlertState, AlertStatistics, AlertStatusFilter, Installation, ProductionReading,
    WeatherObservation,
};
use shared::performance::PerformanceAssessment;

use crate::error::AppResult;

/// One evaluated production day for one installation
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProductionRecord {
    pub id: Uuid,
    pub pod_code: String,
    pub pod_name: String,
    pub date: NaiveDate,
    pub actual_kwh: f64,
    pub unit: String,
    pub price_per_kwh: Decimal,
    pub earnings: Decimal,
    pub peak_power_kw: f64,
    pub sun_hours: f64,
    pub irradiance_kwh_m2: f64,
    pub expected_kwh: f64,
    pub performance_ratio: Option<f64>,
    pub is_underperforming: bool,
    pub alert_sent: bool,
    pub alert_acknowledged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProductionRecord {
    pub fn alert_state(&self) -> AlertState {
        AlertState::from_flags(self.alert_sent, self.alert_acknowledged)
    }

    /// True when this record should be included in the next alert dispatch
    pub fn needs_notification(&self) -> bool {
        self.is_underperforming && self.alert_state().eligible_for_notification()
    }

    pub fn performance_percent(&self) -> Option<f64> {
        self.performance_ratio.map(|ratio| ratio * 100.0)
    }
}

/// Identifies one record by its natural key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertKey {
    pub pod_code: String,
    pub date: NaiveDate,
}

impl From<&ProductionRecord> for AlertKey {
    fn from(record: &ProductionRecord) -> Self {
        Self {
            pod_code: record.pod_code.clone(),
            date: record.date,
        }
    }
}

/// Filter parameters for listing alerts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(default)]
    pub status: AlertStatusFilter,
    pub date: Option<NaiveDate>,
    pub pod_code: Option<String>,
}

/// Selects records targeted by acknowledge/reset actions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertSelector {
    pub pod_code: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Alert store service
#[derive(Clone)]
pub struct AlertService {
    db: PgPool,
}

impl AlertService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get a single record by its natural key
    pub async fn get(
        &self,
        pod_code: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ProductionRecord>> {
        let record = sqlx::query_as::<_, ProductionRecord>(
            r#"
            SELECT id, pod_code, pod_name, date, actual_kwh, unit, price_per_kwh, earnings,
                   peak_power_kw, sun_hours, irradiance_kwh_m2, expected_kwh,
                   performance_ratio, is_underperforming, alert_sent, alert_acknowledged,
                   created_at, updated_at
            FROM production_records
            WHERE pod_code = $1 AND date = $2
            "#,
        )
        .bind(pod_code)
        .bind(date)
        .fetch_optional(&self.db)
        .await?;

        Ok(record)
    }

    /// Upsert the evaluation outcome for one installation and day.
    /// Alert flags are never touched here: a re-run refreshes the metrics
    /// while alert_sent and alert_acknowledged keep their current values.
    pub async fn record_evaluation(
        &self,
        installation: &Installation,
        reading: &ProductionReading,
        weather: &WeatherObservation,
        assessment: &PerformanceAssessment,
    ) -> AppResult<ProductionRecord> {
        let earnings = installation.earnings_for(reading.energy_kwh);

        let record = sqlx::query_as::<_, ProductionRecord>(
            r#"
            INSERT INTO production_records (
                id, pod_code, pod_name, date, actual_kwh, unit, price_per_kwh, earnings,
                peak_power_kw, sun_hours, irradiance_kwh_m2, expected_kwh,
                performance_ratio, is_underperforming
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            ON CONFLICT (pod_code, date) DO UPDATE SET
                pod_name = EXCLUDED.pod_name,
                actual_kwh = EXCLUDED.actual_kwh,
                unit = EXCLUDED.unit,
                price_per_kwh = EXCLUDED.price_per_kwh,
                earnings = EXCLUDED.earnings,
                peak_power_kw = EXCLUDED.peak_power_kw,
                sun_hours = EXCLUDED.sun_hours,
                irradiance_kwh_m2 = EXCLUDED.irradiance_kwh_m2,
                expected_kwh = EXCLUDED.expected_kwh,
                performance_ratio = EXCLUDED.performance_ratio,
                is_underperforming = EXCLUDED.is_underperforming,
                updated_at = NOW()
            RETURNING id, pod_code, pod_name, date, actual_kwh, unit, price_per_kwh, earnings,
                      peak_power_kw, sun_hours, irradiance_kwh_m2, expected_kwh,
                      performance_ratio, is_underperforming, alert_sent, alert_acknowledged,
                      created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&installation.pod_code)
        .bind(&installation.name)
        .bind(reading.date)
        .bind(reading.energy_kwh)
        .bind(&reading.unit)
        .bind(installation.price_per_kwh)
        .bind(earnings)
        .bind(installation.peak_power_kw)
        .bind(weather.sun_hours)
        .bind(weather.irradiance_kwh_m2)
        .bind(assessment.expected_kwh)
        .bind(assessment.performance_ratio)
        .bind(assessment.is_underperforming)
        .fetch_one(&self.db)
        .await?;

        Ok(record)
    }

    /// List underperforming records matching the filter, newest first
    pub async fn query(&self, filter: &AlertFilter) -> AppResult<Vec<ProductionRecord>> {
        let mut sql = String::from(
            r#"
            SELECT id, pod_code, pod_name, date, actual_kwh, unit, price_per_kwh, earnings,
                   peak_power_kw, sun_hours, irradiance_kwh_m2, expected_kwh,
                   performance_ratio, is_underperforming, alert_sent, alert_acknowledged,
                   created_at, updated_at
            FROM production_records
            WHERE is_underperforming = TRUE"#,
        );

        if let Some(predicate) = status_predicate(filter.status) {
            sql.push_str(" AND ");
            sql.push_str(predicate);
        }

        let mut bind_index = 0;
        if filter.date.is_some() {
            bind_index += 1;
            sql.push_str(&format!(" AND date = ${}", bind_index));
        }
        if filter.pod_code.is_some() {
            bind_index += 1;
            sql.push_str(&format!(" AND pod_code = ${}", bind_index));
        }
        sql.push_str(" ORDER BY date DESC, pod_code ASC");

        let mut query = sqlx::query_as::<_, ProductionRecord>(&sql);
        if let Some(date) = filter.date {
            query = query.bind(date);
        }
        if let Some(pod_code) = &filter.pod_code {
            query = query.bind(pod_code);
        }

        let records = query.fetch_all(&self.db).await?;
        Ok(records)
    }

    /// Underperforming records still awaiting a successful dispatch, across all dates
    pub async fn pending_alerts(&self) -> AppResult<Vec<ProductionRecord>> {
        let records = sqlx::query_as::<_, ProductionRecord>(
            r#"
            SELECT id, pod_code, pod_name, date, actual_kwh, unit, price_per_kwh, earnings,
                   peak_power_kw, sun_hours, irradiance_kwh_m2, expected_kwh,
                   performance_ratio, is_underperforming, alert_sent, alert_acknowledged,
                   created_at, updated_at
            FROM production_records
            WHERE is_underperforming = TRUE
              AND alert_sent = FALSE
              AND alert_acknowledged = FALSE
            ORDER BY date DESC, pod_code ASC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(records)
    }

    /// Mark the given records as sent after a confirmed delivery.
    /// The whole batch commits atomically.
    pub async fn mark_sent(&self, keys: &[AlertKey]) -> AppResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin().await?;
        let mut affected = 0;
        for key in keys {
            let result = sqlx::query(
                r#"
                UPDATE production_records
                SET alert_sent = TRUE, updated_at = NOW()
                WHERE pod_code = $1 AND date = $2
                "#,
            )
            .bind(&key.pod_code)
            .bind(key.date)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }
        tx.commit().await?;

        Ok(affected)
    }

    /// Acknowledge underperformance alerts. Returns the number of records changed.
    pub async fn acknowledge(&self, selector: &AlertSelector) -> AppResult<u64> {
        let mut sql = String::from(
            r#"
            UPDATE production_records
            SET alert_acknowledged = TRUE, updated_at = NOW()
            WHERE is_underperforming = TRUE"#,
        );

        let mut bind_index = 0;
        if selector.date.is_some() {
            bind_index += 1;
            sql.push_str(&format!(" AND date = ${}", bind_index));
        }
        if selector.pod_code.is_some() {
            bind_index += 1;
            sql.push_str(&format!(" AND pod_code = ${}", bind_index));
        }

        let mut query = sqlx::query(&sql);
        if let Some(date) = selector.date {
            query = query.bind(date);
        }
        if let Some(pod_code) = &selector.pod_code {
            query = query.bind(pod_code);
        }

        let result = query.execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    /// Clear both alert flags so matching records re-enter the pending pool.
    /// Unlike acknowledge this is not scoped to underperforming records, so
    /// stale flags on recovered days are cleared as well.
    pub async fn reset(&self, selector: &AlertSelector) -> AppResult<u64> {
        let mut sql = String::from(
            r#"
            UPDATE production_records
            SET alert_sent = FALSE, alert_acknowledged = FALSE, updated_at = NOW()"#,
        );

        let mut clauses = Vec::new();
        let mut bind_index = 0;
        if selector.date.is_some() {
            bind_index += 1;
            clauses.push(format!("date = ${}", bind_index));
        }
        if selector.pod_code.is_some() {
            bind_index += 1;
            clauses.push(format!("pod_code = ${}", bind_index));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let mut query = sqlx::query(&sql);
        if let Some(date) = selector.date {
            query = query.bind(date);
        }
        if let Some(pod_code) = &selector.pod_code {
            query = query.bind(pod_code);
        }

        let result = query.execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    /// Alert workflow counters over all underperforming records
    pub async fn stats(&self) -> AppResult<AlertStatistics> {
        let (total, pending, sent, acknowledged) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
            r#"
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE alert_sent = FALSE AND alert_acknowledged = FALSE) AS pending,
                COUNT(*) FILTER (WHERE alert_sent = TRUE AND alert_acknowledged = FALSE) AS sent,
                COUNT(*) FILTER (WHERE alert_acknowledged = TRUE) AS acknowledged
            FROM production_records
            WHERE is_underperforming = TRUE
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        Ok(AlertStatistics {
            total,
            pending,
            sent,
            acknowledged,
        })
    }
}

/// SQL predicate for a status filter, None when no narrowing applies
fn status_predicate(status: AlertStatusFilter) -> Option<&'static str> {
    match status {
        AlertStatusFilter::All => None,
        AlertStatusFilter::Pending => Some("alert_sent = FALSE AND alert_acknowledged = FALSE"),
        AlertStatusFilter::Sent => Some("alert_sent = TRUE AND alert_acknowledged = FALSE"),
        AlertStatusFilter::Acknowledged => Some("alert_acknowledged = TRUE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample_record(is_underperforming: bool, sent: bool, acknowledged: bool) -> ProductionRecord {
        ProductionRecord {
            id: Uuid::new_v4(),
            pod_code: "LU-0001-PV".to_string(),
            pod_name: "Rooftop East".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            actual_kwh: 10.0,
            unit: "kWh".to_string(),
            price_per_kwh: Decimal::new(15, 2),
            earnings: Decimal::new(150, 2),
            peak_power_kw: 10.0,
            sun_hours: 5.0,
            irradiance_kwh_m2: 4.0,
            expected_kwh: 32.0,
            performance_ratio: Some(0.3125),
            is_underperforming,
            alert_sent: sent,
            alert_acknowledged: acknowledged,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_needs_notification_only_when_pending_and_underperforming() {
        assert!(sample_record(true, false, false).needs_notification());
        assert!(!sample_record(true, true, false).needs_notification());
        assert!(!sample_record(true, false, true).needs_notification());
        assert!(!sample_record(true, true, true).needs_notification());
        assert!(!sample_record(false, false, false).needs_notification());
    }

    #[test]
    fn test_alert_state_from_flags() {
        assert_eq!(sample_record(true, false, false).alert_state(), AlertState::Pending);
        assert_eq!(
            sample_record(true, true, false).alert_state(),
            AlertState::Sent
        );
        assert_eq!(
            sample_record(true, true, true).alert_state(),
            AlertState::Acknowledged { sent: true }
        );
    }

    #[test]
    fn test_performance_percent() {
        let record = sample_record(true, false, false);
        assert_eq!(record.performance_percent(), Some(31.25));

        let mut no_ratio = record;
        no_ratio.performance_ratio = None;
        assert_eq!(no_ratio.performance_percent(), None);
    }

    #[test]
    fn test_alert_key_from_record() {
        let record = sample_record(true, false, false);
        let key = AlertKey::from(&record);
        assert_eq!(key.pod_code, "LU-0001-PV");
        assert_eq!(key.date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn test_status_predicate_fragments() {
        assert_eq!(status_predicate(AlertStatusFilter::All), None);
        assert_eq!(
            status_predicate(AlertStatusFilter::Pending),
            Some("alert_sent = FALSE AND alert_acknowledged = FALSE")
        );
        assert_eq!(
            status_predicate(AlertStatusFilter::Sent),
            Some("alert_sent = TRUE AND alert_acknowledged = FALSE")
        );
        assert_eq!(
            status_predicate(AlertStatusFilter::Acknowledged),
            Some("alert_acknowledged = TRUE")
        );
    }
}
