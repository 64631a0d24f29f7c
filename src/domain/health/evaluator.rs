//! Subscription health and churn-risk evaluation.
//!
//! Each of the four categories collapses to a status through a fixed
//! threshold. The overall score is binary per category: a healthy category
//! contributes `weight * 100`, anything else contributes nothing.
//!
//! | Category    | Weight | Unhealthy when                        |
//! |-------------|--------|---------------------------------------|
//! | payment     | 0.4    | failure rate > 5%                     |
//! | fulfillment | 0.3    | delay frequency > 5%                  |
//! | retention   | 0.2    | churn risk score > 70                 |
//! | support     | 0.1    | average response time > 24h           |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::alert::{Alert, AlertKind, AlertSeverity};
use super::signals::{
    FulfillmentSignals, HealthSignals, PaymentSignals, RetentionSignals, SupportSignals,
};

/// Thresholds applied to health signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthThresholds {
    pub payment_failure_rate: f64,
    pub fulfillment_delay_frequency: f64,
    pub churn_risk: f64,
    pub support_response_hours: f64,
    /// Days past the delivery estimate before an order counts as delayed.
    pub delivery_delay_days: i64,
    /// Hours a payment retry may remain unresolved.
    pub retry_resolution_hours: f64,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            payment_failure_rate: 0.05,
            fulfillment_delay_frequency: 0.05,
            churn_risk: 70.0,
            support_response_hours: 24.0,
            delivery_delay_days: 2,
            retry_resolution_hours: 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCategory {
    Payment,
    Fulfillment,
    Retention,
    Support,
}

impl HealthCategory {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Payment => 0.4,
            Self::Fulfillment => 0.3,
            Self::Retention => 0.2,
            Self::Support => 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Healthy,
    Critical,
    HighRisk,
    AttentionNeeded,
}

impl CheckStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }
}

/// Outcome of one category check, with the signals it was judged on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthCheck<S> {
    pub status: CheckStatus,
    pub metrics: S,
}

/// Derived, read-only health snapshot for one subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    pub subscription_id: String,
    pub payment_health: HealthCheck<PaymentSignals>,
    pub fulfillment_health: HealthCheck<FulfillmentSignals>,
    pub retention_risk: HealthCheck<RetentionSignals>,
    pub support_health: HealthCheck<SupportSignals>,
    pub overall_health_score: u8,
    pub evaluated_at: DateTime<Utc>,
}

impl HealthMetrics {
    pub fn statuses(&self) -> [(HealthCategory, CheckStatus); 4] {
        [
            (HealthCategory::Payment, self.payment_health.status),
            (HealthCategory::Fulfillment, self.fulfillment_health.status),
            (HealthCategory::Retention, self.retention_risk.status),
            (HealthCategory::Support, self.support_health.status),
        ]
    }

    pub fn churn_risk_score(&self) -> f64 {
        self.retention_risk.metrics.churn_risk_score
    }
}

/// Weighted overall score in `0..=100`.
pub fn overall_score(statuses: &[(HealthCategory, CheckStatus)]) -> u8 {
    let score: f64 = statuses
        .iter()
        .filter(|(_, status)| status.is_healthy())
        .map(|(category, _)| category.weight() * 100.0)
        .sum();
    score.round().clamp(0.0, 100.0) as u8
}

/// Applies thresholds to signals. Pure; emission happens in the application layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthEvaluator {
    thresholds: HealthThresholds,
}

impl HealthEvaluator {
    pub fn new(thresholds: HealthThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &HealthThresholds {
        &self.thresholds
    }

    pub fn evaluate(
        &self,
        subscription_id: &str,
        signals: &HealthSignals,
        now: DateTime<Utc>,
    ) -> HealthMetrics {
        let t = &self.thresholds;

        let payment_status = if signals.payment.failure_rate > t.payment_failure_rate {
            CheckStatus::Critical
        } else {
            CheckStatus::Healthy
        };
        let fulfillment_status =
            if signals.fulfillment.delay_frequency > t.fulfillment_delay_frequency {
                CheckStatus::Critical
            } else {
                CheckStatus::Healthy
            };
        let retention_status = if signals.retention.churn_risk_score > t.churn_risk {
            CheckStatus::HighRisk
        } else {
            CheckStatus::Healthy
        };
        let support_status = if signals.support.average_response_hours > t.support_response_hours
        {
            CheckStatus::AttentionNeeded
        } else {
            CheckStatus::Healthy
        };

        let overall_health_score = overall_score(&[
            (HealthCategory::Payment, payment_status),
            (HealthCategory::Fulfillment, fulfillment_status),
            (HealthCategory::Retention, retention_status),
            (HealthCategory::Support, support_status),
        ]);

        HealthMetrics {
            subscription_id: subscription_id.to_string(),
            payment_health: HealthCheck {
                status: payment_status,
                metrics: signals.payment,
            },
            fulfillment_health: HealthCheck {
                status: fulfillment_status,
                metrics: signals.fulfillment,
            },
            retention_risk: HealthCheck {
                status: retention_status,
                metrics: signals.retention,
            },
            support_health: HealthCheck {
                status: support_status,
                metrics: signals.support,
            },
            overall_health_score,
            evaluated_at: now,
        }
    }

    /// Whether payment retries are resolving inside the configured window.
    /// `None` when the resolution time is unknown.
    pub fn retry_resolution_within_target(&self, payment: &PaymentSignals) -> Option<bool> {
        payment
            .average_retry_resolution_hours
            .map(|hours| hours <= self.thresholds.retry_resolution_hours)
    }

    /// One alert per unhealthy category. Not deduplicated across evaluations.
    pub fn alerts(&self, metrics: &HealthMetrics) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let id = &metrics.subscription_id;

        if !metrics.payment_health.status.is_healthy() {
            alerts.push(alert(
                AlertKind::PaymentHealth,
                AlertSeverity::High,
                "Critical payment health issues detected",
                id,
                &metrics.payment_health.metrics,
            ));
        }
        if !metrics.fulfillment_health.status.is_healthy() {
            alerts.push(alert(
                AlertKind::FulfillmentHealth,
                AlertSeverity::Medium,
                "Fulfillment delays above tolerance detected",
                id,
                &metrics.fulfillment_health.metrics,
            ));
        }
        if !metrics.retention_risk.status.is_healthy() {
            alerts.push(alert(
                AlertKind::RetentionRisk,
                AlertSeverity::Medium,
                "High retention risk detected",
                id,
                &metrics.retention_risk.metrics,
            ));
        }
        if !metrics.support_health.status.is_healthy() {
            alerts.push(alert(
                AlertKind::SupportHealth,
                AlertSeverity::Low,
                "Support response times need attention",
                id,
                &metrics.support_health.metrics,
            ));
        }

        alerts
    }
}

fn alert<S: Serialize>(
    kind: AlertKind,
    severity: AlertSeverity,
    message: &str,
    subscription_id: &str,
    metrics: &S,
) -> Alert {
    Alert {
        kind,
        severity,
        message: message.to_string(),
        subscription_id: subscription_id.to_string(),
        metrics: serde_json::to_value(metrics).unwrap_or_default(),
    }
}
