//! Alert lifecycle models
//!
//! The store persists the alert lifecycle of a (pod_code, date) record as
//! two booleans. In memory the lifecycle is an explicit enum so the three
//! valid states are exhaustive and no illegal combination can be built.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an alert record
///
/// `Acknowledged` remembers whether a notification had gone out before the
/// operator acknowledged, so the state converts to and from the persisted
/// flag pair without loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertState {
    /// Underperformance detected but not yet notified
    Pending,
    /// Notification confirmed delivered, awaiting operator action
    Sent,
    /// Operator acknowledged; suppressed until an explicit reset
    Acknowledged { sent: bool },
}

impl AlertState {
    /// Reconstruct the state from the persisted (alert_sent, alert_acknowledged) pair
    pub fn from_flags(alert_sent: bool, alert_acknowledged: bool) -> Self {
        if alert_acknowledged {
            AlertState::Acknowledged { sent: alert_sent }
        } else if alert_sent {
            AlertState::Sent
        } else {
            AlertState::Pending
        }
    }

    /// The persisted flag pair (alert_sent, alert_acknowledged)
    pub fn flags(&self) -> (bool, bool) {
        match self {
            AlertState::Pending => (false, false),
            AlertState::Sent => (true, false),
            AlertState::Acknowledged { sent } => (*sent, true),
        }
    }

    /// Whether a record in this state may still be notified
    ///
    /// Only pending records qualify. Sent records stay silent so repeated
    /// evaluations of the same day never duplicate a notification, and
    /// acknowledged records stay silent until an explicit reset.
    pub fn eligible_for_notification(&self) -> bool {
        matches!(self, AlertState::Pending)
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertState::Pending => "pending",
            AlertState::Sent => "sent",
            AlertState::Acknowledged { .. } => "acknowledged",
        }
    }
}

impl std::fmt::Display for AlertState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Status filter for alert queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatusFilter {
    #[default]
    All,
    Pending,
    Sent,
    Acknowledged,
}

impl AlertStatusFilter {
    pub fn matches(&self, state: AlertState) -> bool {
        match self {
            AlertStatusFilter::All => true,
            AlertStatusFilter::Pending => state == AlertState::Pending,
            AlertStatusFilter::Sent => state == AlertState::Sent,
            AlertStatusFilter::Acknowledged => {
                matches!(state, AlertState::Acknowledged { .. })
            }
        }
    }
}

impl std::str::FromStr for AlertStatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(AlertStatusFilter::All),
            "pending" => Ok(AlertStatusFilter::Pending),
            "sent" => Ok(AlertStatusFilter::Sent),
            "acknowledged" => Ok(AlertStatusFilter::Acknowledged),
            other => Err(format!("unknown alert status: {}", other)),
        }
    }
}

/// Alert counts by lifecycle state over all underperforming records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertStatistics {
    pub total: i64,
    pub pending: i64,
    pub sent: i64,
    pub acknowledged: i64,
}
