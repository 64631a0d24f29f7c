//! Historical aggregates feeding the health evaluation.
//!
//! How these are derived (ticket systems, engagement scoring, order history)
//! is left to a `HealthSignalSource` implementation. The evaluator only
//! applies thresholds and weights to them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentSignals {
    /// Fraction of billing attempts that failed, `0.0..=1.0`.
    #[serde(default)]
    pub failure_rate: f64,
    #[serde(default)]
    pub retry_success_rate: Option<f64>,
    #[serde(default)]
    pub average_retry_resolution_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentSignals {
    /// Fraction of deliveries that arrived late, `0.0..=1.0`.
    #[serde(default)]
    pub delay_frequency: f64,
    #[serde(default)]
    pub on_time_delivery_rate: Option<f64>,
    #[serde(default)]
    pub average_processing_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RetentionSignals {
    /// Churn risk, `0.0..=100.0`.
    #[serde(default)]
    pub churn_risk_score: f64,
    #[serde(default)]
    pub engagement_score: Option<f64>,
    #[serde(default)]
    pub satisfaction_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SupportSignals {
    #[serde(default)]
    pub average_response_hours: f64,
    #[serde(default)]
    pub open_tickets: u32,
    #[serde(default)]
    pub satisfaction_rating: Option<f64>,
}

/// All four signal groups for one subscription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSignals {
    #[serde(default)]
    pub payment: PaymentSignals,
    #[serde(default)]
    pub fulfillment: FulfillmentSignals,
    #[serde(default)]
    pub retention: RetentionSignals,
    #[serde(default)]
    pub support: SupportSignals,
}
