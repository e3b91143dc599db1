//! Daily evaluation pipeline
//! Correlates metered production with weather-derived expected output and
//! hands underperformance alerts to the notification workflow

use chrono::NaiveDate;
use serde::Serialize;

use shared::models::Installation;
use shared::performance::{self, PerformanceSettings};

use crate::error::{AppError, AppResult};
use crate::external::{EnergyClient, WeatherClient};
use crate::services::alerts::{AlertKey, AlertService, ProductionRecord};
use crate::services::notification::AlertNotifier;

/// Outcome of the notification phase of a run
#[derive(Debug, Clone, Serialize)]
pub enum NotificationOutcome {
    /// No records were waiting for dispatch
    NonePending,
    /// Alerts were delivered and committed as sent
    Sent {
        alerts: usize,
        delivered_recipients: usize,
        failed_recipients: usize,
    },
    /// Delivery did not meet the commit policy, records stay pending
    Failed { alerts: usize, detail: String },
}

/// One installation skipped during a run
#[derive(Debug, Clone, Serialize)]
pub struct SkippedInstallation {
    pub pod_code: String,
    pub reason: String,
}

/// Result of one daily evaluation run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub evaluated: usize,
    pub alerts_detected: usize,
    pub skipped: Vec<SkippedInstallation>,
    pub notification: NotificationOutcome,
}

/// Evaluation pipeline service
#[derive(Clone)]
pub struct EvaluationService {
    store: AlertService,
    energy: EnergyClient,
    weather: WeatherClient,
    settings: PerformanceSettings,
}

impl EvaluationService {
    pub fn new(
        store: AlertService,
        energy: EnergyClient,
        weather: WeatherClient,
        settings: PerformanceSettings,
    ) -> Self {
        Self {
            store,
            energy,
            weather,
            settings,
        }
    }

    /// Evaluate one installation for one day and persist the outcome
    pub async fn evaluate_installation(
        &self,
        installation: &Installation,
        date: NaiveDate,
    ) -> AppResult<ProductionRecord> {
        let weather = self
            .weather
            .daily_observation(&installation.coordinates, date)
            .await?;
        let reading = self.energy.daily_yield(&installation.pod_code, date).await?;

        let assessment = performance::assess(
            reading.energy_kwh,
            installation.peak_power_kw,
            weather.irradiance_kwh_m2,
            &self.settings,
        )?;

        let percent = assessment
            .performance_ratio
            .map(|ratio| format!("{:.1}%", ratio * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        if assessment.is_underperforming {
            tracing::warn!(
                "{} on {}: {:.2} kWh, expected {:.2} kWh ({})",
                installation.pod_code,
                date,
                reading.energy_kwh,
                assessment.expected_kwh,
                percent
            );
        } else {
            tracing::info!(
                "{} on {}: {:.2} kWh, expected {:.2} kWh ({})",
                installation.pod_code,
                date,
                reading.energy_kwh,
                assessment.expected_kwh,
                percent
            );
        }

        self.store
            .record_evaluation(installation, &reading, &weather, &assessment)
            .await
    }

    /// Evaluate every installation for the given day, then dispatch pending alerts.
    /// A failing installation is skipped and the run continues; a store failure
    /// aborts the whole run.
    pub async fn run_daily(
        &self,
        installations: &[Installation],
        date: NaiveDate,
        notifier: &AlertNotifier,
    ) -> AppResult<RunSummary> {
        tracing::info!(
            "Evaluating {} installation(s) for {}",
            installations.len(),
            date
        );

        let mut evaluated = 0;
        let mut alerts_detected = 0;
        let mut skipped = Vec::new();

        for installation in installations {
            match self.evaluate_installation(installation, date).await {
                Ok(record) => {
                    evaluated += 1;
                    if record.is_underperforming {
                        alerts_detected += 1;
                    }
                }
                Err(e @ AppError::Database(_)) => return Err(e),
                Err(e) => {
                    tracing::error!("Skipping {}: {}", installation.pod_code, e);
                    skipped.push(SkippedInstallation {
                        pod_code: installation.pod_code.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let notification = self.notify_pending(notifier).await?;

        Ok(RunSummary {
            date,
            evaluated,
            alerts_detected,
            skipped,
            notification,
        })
    }

    /// Dispatch every pending alert across all dates. Records are marked sent
    /// only after the delivery report satisfies the commit policy, so a failed
    /// dispatch is retried on the next run.
    pub async fn notify_pending(&self, notifier: &AlertNotifier) -> AppResult<NotificationOutcome> {
        let pending = self.store.pending_alerts().await?;
        if pending.is_empty() {
            tracing::info!("No pending alerts");
            return Ok(NotificationOutcome::NonePending);
        }
        tracing::info!("Dispatching {} pending alert(s)", pending.len());

        let report = match notifier.dispatch(&pending).await {
            Ok(report) => report,
            Err(e @ AppError::DeliveryFailure(_)) => {
                tracing::error!("Alert dispatch failed, records stay pending: {}", e);
                return Ok(NotificationOutcome::Failed {
                    alerts: pending.len(),
                    detail: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        if notifier.policy_satisfied(&report) {
            let keys: Vec<AlertKey> = pending.iter().map(AlertKey::from).collect();
            let marked = self.store.mark_sent(&keys).await?;
            tracing::info!("Marked {} record(s) as sent", marked);
            Ok(NotificationOutcome::Sent {
                alerts: pending.len(),
                delivered_recipients: report.delivered_count(),
                failed_recipients: report.failed_count(),
            })
        } else {
            let detail = format!(
                "delivered to {} of {} recipient(s), commit policy requires all",
                report.delivered_count(),
                report.outcomes.len()
            );
            tracing::error!("{}, records stay pending", detail);
            Ok(NotificationOutcome::Failed {
                alerts: pending.len(),
                detail,
            })
        }
    }
}
