//! Alerts raised when a health check or fulfillment check crosses a threshold.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PaymentHealth,
    FulfillmentHealth,
    RetentionRisk,
    SupportHealth,
    FulfillmentDelay,
}

/// An ephemeral alert, emitted to the analytics sink and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub subscription_id: String,
    pub metrics: Value,
}
