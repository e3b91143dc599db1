//! Alert management CLI
//! Lists, acknowledges, and resets underperformance alerts from the command line

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use std::{env, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shared::models::AlertStatusFilter;
use spm_backend::config::Config;
use spm_backend::services::alerts::{AlertFilter, AlertSelector};
use spm_backend::services::AlertService;

const USAGE: &str = "usage: alertctl <list|stats|acknowledge|reset> \
                     [--status <pending|sent|acknowledged|all>] [--pod <code>] \
                     [--date <YYYY-MM-DD>] [--confirm]";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "alertctl=info,spm_backend=warn,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("{}", USAGE);
    }
    let action = args[1].as_str();

    let mut status = AlertStatusFilter::All;
    let mut pod_code: Option<String> = None;
    let mut date: Option<NaiveDate> = None;
    let mut confirm = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--status" => {
                i += 1;
                let value = args.get(i).context("--status requires a value")?;
                status = value
                    .parse()
                    .map_err(|e: String| anyhow::anyhow!("{}", e))?;
            }
            "--pod" => {
                i += 1;
                pod_code = Some(args.get(i).context("--pod requires a value")?.clone());
            }
            "--date" => {
                i += 1;
                let value = args.get(i).context("--date requires a value")?;
                date = Some(
                    NaiveDate::parse_from_str(value, "%Y-%m-%d")
                        .with_context(|| format!("invalid date '{}', expected YYYY-MM-DD", value))?,
                );
            }
            "--confirm" => confirm = true,
            other => bail!("unknown option '{}'\n{}", other, USAGE),
        }
        i += 1;
    }

    let config = Config::load().context("failed to load configuration")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.database.url)
        .await
        .context("failed to connect to database")?;
    let service = AlertService::new(pool);

    match action {
        "list" => {
            let filter = AlertFilter {
                status,
                date,
                pod_code,
            };
            let records = service.query(&filter).await?;
            if records.is_empty() {
                println!("No matching alerts");
                return Ok(());
            }

            println!(
                "{:<12} {:<16} {:<24} {:>10} {:>10} {:>6}  {}",
                "Date", "POD", "Installation", "Actual", "Expected", "Perf", "State"
            );
            for record in &records {
                let percent = record
                    .performance_percent()
                    .map(|p| format!("{:.0}%", p))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{:<12} {:<16} {:<24} {:>10.2} {:>10.2} {:>6}  {}",
                    record.date.to_string(),
                    record.pod_code,
                    record.pod_name,
                    record.actual_kwh,
                    record.expected_kwh,
                    percent,
                    record.alert_state()
                );
            }
            println!("{} alert(s)", records.len());
        }
        "stats" => {
            let stats = service.stats().await?;
            println!("total:        {}", stats.total);
            println!("pending:      {}", stats.pending);
            println!("sent:         {}", stats.sent);
            println!("acknowledged: {}", stats.acknowledged);
        }
        "acknowledge" | "reset" => {
            if !confirm {
                bail!("{} modifies alert state, pass --confirm to proceed", action);
            }
            let selector = AlertSelector { pod_code, date };
            let affected = if action == "acknowledge" {
                service.acknowledge(&selector).await?
            } else {
                service.reset(&selector).await?
            };
            println!(
                "{} {} record(s)",
                if action == "acknowledge" {
                    "Acknowledged"
                } else {
                    "Reset"
                },
                affected
            );
        }
        other => bail!("unknown action '{}'\n{}", other, USAGE),
    }

    Ok(())
}
