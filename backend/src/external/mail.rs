//! Mail delivery for alert notifications
//!
//! Delivery goes through an HTTP mail relay. Every recipient is attempted
//! independently so one refused address never blocks the others; the
//! per-address outcomes feed the sent-flag commit decision upstream.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::error::AppResult;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Delivery outcome for a single recipient
#[derive(Debug, Clone)]
pub struct RecipientOutcome {
    pub address: String,
    pub accepted: bool,
    pub error: Option<String>,
}

/// Per-recipient outcomes of one dispatch
#[derive(Debug, Clone, Default)]
pub struct DeliveryReport {
    pub outcomes: Vec<RecipientOutcome>,
}

impl DeliveryReport {
    pub fn delivered_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.accepted).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.delivered_count()
    }

    pub fn any_delivered(&self) -> bool {
        self.outcomes.iter().any(|o| o.accepted)
    }

    pub fn all_delivered(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.accepted)
    }

    /// Whether the batch counts as delivered under the configured policy
    pub fn satisfies(&self, require_all: bool) -> bool {
        if require_all {
            self.all_delivered()
        } else {
            self.any_delivered()
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecipientOutcome> {
        self.outcomes.iter().filter(|o| !o.accepted)
    }
}

/// Transport seam for alert mail
///
/// The production implementation talks to the HTTP relay; tests substitute
/// an in-memory transport.
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Deliver one message to every recipient, reporting per-address outcomes
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> AppResult<DeliveryReport>;
}

/// HTTP mail relay client
#[derive(Clone)]
pub struct MailRelayClient {
    client: Client,
    relay_url: String,
    api_token: String,
    sender: String,
}

/// Relay send request
#[derive(Debug, Serialize)]
struct RelaySendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl MailRelayClient {
    /// Create a new MailRelayClient
    pub fn new(relay_url: String, api_token: String, sender: String) -> Self {
        Self {
            client: Client::new(),
            relay_url,
            api_token,
            sender,
        }
    }

    /// Send one message to one recipient
    async fn send_one(&self, recipient: &str, subject: &str, html: &str) -> Result<(), String> {
        let request = RelaySendRequest {
            from: &self.sender,
            to: recipient,
            subject,
            html,
        };

        let response = self
            .client
            .post(&self.relay_url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| format!("Failed to reach mail relay: {}", e))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(format!("Mail relay rejected message: {} - {}", status, body))
        }
    }
}

#[async_trait]
impl MailTransport for MailRelayClient {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> AppResult<DeliveryReport> {
        let mut outcomes = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            match self.send_one(recipient, subject, html_body).await {
                Ok(()) => {
                    tracing::info!("Alert mail delivered to {}", recipient);
                    outcomes.push(RecipientOutcome {
                        address: recipient.clone(),
                        accepted: true,
                        error: None,
                    });
                }
                Err(e) => {
                    tracing::error!("Alert mail to {} failed: {}", recipient, e);
                    outcomes.push(RecipientOutcome {
                        address: recipient.clone(),
                        accepted: false,
                        error: Some(e),
                    });
                }
            }
        }

        Ok(DeliveryReport { outcomes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(address: &str, accepted: bool) -> RecipientOutcome {
        RecipientOutcome {
            address: address.to_string(),
            accepted,
            error: if accepted {
                None
            } else {
                Some("rejected".to_string())
            },
        }
    }

    #[test]
    fn test_report_counts() {
        let report = DeliveryReport {
            outcomes: vec![outcome("a@x.com", true), outcome("b@x.com", false)],
        };
        assert_eq!(report.delivered_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.any_delivered());
        assert!(!report.all_delivered());
    }

    #[test]
    fn test_policy_any_vs_all() {
        let partial = DeliveryReport {
            outcomes: vec![outcome("a@x.com", true), outcome("b@x.com", false)],
        };
        assert!(partial.satisfies(false));
        assert!(!partial.satisfies(true));

        let complete = DeliveryReport {
            outcomes: vec![outcome("a@x.com", true), outcome("b@x.com", true)],
        };
        assert!(complete.satisfies(true));
    }

    #[test]
    fn test_empty_report_satisfies_nothing() {
        let empty = DeliveryReport::default();
        assert!(!empty.satisfies(false));
        assert!(!empty.satisfies(true));
    }
}
