//! Alert notification composition and dispatch
//! Builds one batched email per run and enforces the delivery commit policy

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::EmailConfig;
use crate::error::{AppError, AppResult};
use crate::external::{DeliveryReport, MailTransport};
use crate::services::alerts::ProductionRecord;

/// Subject line for a dispatch batch
pub fn compose_subject(alert_count: usize) -> String {
    format!(
        "Solar Performance Alert - {} Installation(s) Underperforming",
        alert_count
    )
}

/// HTML body listing every alert, grouped by date with the newest day first
pub fn compose_html_body(alerts: &[ProductionRecord], threshold: f64) -> String {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ProductionRecord>> = BTreeMap::new();
    for alert in alerts {
        by_date.entry(alert.date).or_default().push(alert);
    }

    let mut body = String::new();
    body.push_str("<html><body style=\"font-family: Arial, sans-serif;\">");
    body.push_str("<h2 style=\"color: #c0392b;\">Solar Production Alert</h2>");
    body.push_str(&format!(
        "<p>The following installations produced less than {:.0}% of their expected output.</p>",
        threshold * 100.0
    ));

    for (date, records) in by_date.iter().rev() {
        body.push_str(&format!("<h3>{}</h3>", date.format("%A, %d %B %Y")));
        body.push_str(
            "<table border=\"1\" cellpadding=\"6\" style=\"border-collapse: collapse;\">",
        );
        body.push_str(
            "<tr style=\"background-color: #f2f2f2;\">\
             <th>Installation</th><th>Actual</th><th>Expected</th>\
             <th>Performance</th><th>Weather</th></tr>",
        );
        for record in records {
            let percent = record
                .performance_percent()
                .map(|p| format!("{:.1}%", p))
                .unwrap_or_else(|| "n/a".to_string());
            body.push_str(&format!(
                "<tr><td>{} ({})</td><td>{:.2} kWh</td><td>{:.2} kWh</td>\
                 <td style=\"color: #c0392b;\">{}</td>\
                 <td>{:.1}h sun, {:.2} kWh/m&sup2;</td></tr>",
                record.pod_name,
                record.pod_code,
                record.actual_kwh,
                record.expected_kwh,
                percent,
                record.sun_hours,
                record.irradiance_kwh_m2
            ));
        }
        body.push_str("</table>");
    }

    body.push_str(
        "<p style=\"color: #7f8c8d; font-size: 12px;\">\
         Each alert is sent once. Acknowledged alerts stay silent until reset.</p>",
    );
    body.push_str("</body></html>");
    body
}

/// Dispatches alert batches through a mail transport
pub struct AlertNotifier {
    transport: Arc<dyn MailTransport>,
    recipients: Vec<String>,
    require_all_delivered: bool,
    threshold: f64,
}

impl AlertNotifier {
    pub fn new(transport: Arc<dyn MailTransport>, email: &EmailConfig, threshold: f64) -> Self {
        Self {
            transport,
            recipients: email.recipients.clone(),
            require_all_delivered: email.require_all_delivered,
            threshold,
        }
    }

    /// Compose and send one email covering the whole batch.
    /// Fails with DeliveryFailure when no recipient accepted the message.
    pub async fn dispatch(&self, alerts: &[ProductionRecord]) -> AppResult<DeliveryReport> {
        if self.recipients.is_empty() {
            return Err(AppError::Configuration(
                "no alert recipients configured".to_string(),
            ));
        }

        let subject = compose_subject(alerts.len());
        let html = compose_html_body(alerts, self.threshold);
        let report = self.transport.send(&self.recipients, &subject, &html).await?;

        if !report.any_delivered() {
            return Err(AppError::DeliveryFailure(format!(
                "all {} recipient(s) failed",
                report.outcomes.len()
            )));
        }

        Ok(report)
    }

    /// Whether a delivery report is good enough to commit alerts as sent
    pub fn policy_satisfied(&self, report: &DeliveryReport) -> bool {
        report.satisfies(self.require_all_delivered)
    }
}
