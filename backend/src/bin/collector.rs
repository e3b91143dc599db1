//! Daily collection run
//! Evaluates every configured installation for one day, dispatches pending
//! alerts, and prints a production summary for the last week.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use std::{env, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::types::DateRange;
use spm_backend::config::Config;
use spm_backend::external::{EnergyClient, MailRelayClient, WeatherClient};
use spm_backend::services::evaluation::NotificationOutcome;
use spm_backend::services::reporting::DailySummaryRow;
use spm_backend::services::{AlertNotifier, AlertService, EvaluationService, ReportingService};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collector=info,spm_backend=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::load().context("failed to load configuration")?;

    // Default to yesterday: the metering API only serves completed days
    let date = match env::args().nth(1) {
        Some(arg) => NaiveDate::parse_from_str(&arg, "%Y-%m-%d")
            .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", arg))?,
        None => Local::now()
            .date_naive()
            .pred_opt()
            .context("date out of range")?,
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;

    let store = AlertService::new(pool.clone());
    let energy = EnergyClient::new(
        config.metering.base_url.clone(),
        config.metering.api_key.clone(),
        config.metering.energy_id.clone(),
        config.metering.obis_code.clone(),
    );
    let weather = WeatherClient::new(
        config.weather.base_url.clone(),
        config.weather.timezone.clone(),
    );
    let transport = Arc::new(MailRelayClient::new(
        config.email.relay_url.clone(),
        config.email.api_token.clone(),
        config.email.sender.clone(),
    ));
    let notifier = AlertNotifier::new(
        transport,
        &config.email,
        config.monitoring.underperformance_threshold,
    );
    let evaluator = EvaluationService::new(store, energy, weather, config.monitoring);

    let summary = evaluator
        .run_daily(&config.installations, date, &notifier)
        .await?;

    println!();
    println!("Run for {}", summary.date);
    println!(
        "  evaluated: {}, underperforming: {}, skipped: {}",
        summary.evaluated,
        summary.alerts_detected,
        summary.skipped.len()
    );
    for skipped in &summary.skipped {
        println!("  skipped {}: {}", skipped.pod_code, skipped.reason);
    }
    match &summary.notification {
        NotificationOutcome::NonePending => println!("  alerts: none pending"),
        NotificationOutcome::Sent {
            alerts,
            delivered_recipients,
            failed_recipients,
        } => println!(
            "  alerts: {} sent, delivered to {} recipient(s), {} failed",
            alerts, delivered_recipients, failed_recipients
        ),
        NotificationOutcome::Failed { alerts, detail } => {
            println!("  alerts: {} still pending ({})", alerts, detail)
        }
    }

    let reporting = ReportingService::new(pool);
    let range = DateRange::trailing_days(Local::now().date_naive(), 7);
    let rows = reporting.production_summary(&range).await?;
    print_summary_table(&rows);

    if let NotificationOutcome::Failed { .. } = summary.notification {
        anyhow::bail!("alert notification failed, records stay pending");
    }

    Ok(())
}

fn print_summary_table(rows: &[DailySummaryRow]) {
    println!();
    println!("Last 7 days");
    println!(
        "{:<12} {:<24} {:>13} {:>13} {:>6}  {}",
        "Date", "Installation", "Actual", "Expected", "Perf", "Status"
    );
    for row in rows {
        let percent = row
            .performance_ratio
            .map(|ratio| format!("{:.0}%", ratio * 100.0))
            .unwrap_or_else(|| "n/a".to_string());
        let status = if row.is_underperforming { "LOW" } else { "ok" };
        println!(
            "{:<12} {:<24} {:>9.2} kWh {:>9.2} kWh {:>6}  {}",
            row.date.to_string(),
            row.pod_name,
            row.actual_kwh,
            row.expected_kwh,
            percent,
            status
        );
    }

    let total_actual: f64 = rows.iter().map(|row| row.actual_kwh).sum();
    let total_expected: f64 = rows.iter().map(|row| row.expected_kwh).sum();
    let total_earnings: Decimal = rows.iter().map(|row| row.earnings).sum();
    println!(
        "{:<12} {:<24} {:>9.2} kWh {:>9.2} kWh",
        "Total", "", total_actual, total_expected
    );
    println!("Earnings over the period: {} EUR", total_earnings.round_dp(2));
}
