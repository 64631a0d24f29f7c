//! Health monitor.
//!
//! Gathers the four signal groups for a subscription concurrently, evaluates
//! them, and emits `subscription_health_check` plus one `subscription_alert`
//! per unhealthy category.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use super::lifecycle_metrics::LifecycleMetrics;
use super::outbound::bounded;
use crate::domain::health::{Alert, HealthEvaluator, HealthMetrics, HealthSignals};
use crate::domain::subscription::{Customer, Subscription};
use crate::domain::webhook::OutboundError;
use crate::ports::HealthSignalSource;

pub const SUBSCRIPTION_HEALTH_CHECK: &str = "subscription_health_check";
pub const SUBSCRIPTION_ALERT: &str = "subscription_alert";

#[derive(Clone)]
pub struct HealthMonitor {
    signals: Arc<dyn HealthSignalSource>,
    metrics: LifecycleMetrics,
    evaluator: HealthEvaluator,
    timeout: Duration,
}

impl HealthMonitor {
    pub fn new(
        signals: Arc<dyn HealthSignalSource>,
        metrics: LifecycleMetrics,
        evaluator: HealthEvaluator,
        timeout: Duration,
    ) -> Self {
        Self {
            signals,
            metrics,
            evaluator,
            timeout,
        }
    }

    pub fn evaluator(&self) -> &HealthEvaluator {
        &self.evaluator
    }

    /// Evaluate health for one subscription and emit the results.
    pub async fn check(
        &self,
        subscription: &Subscription,
        customer: &Customer,
    ) -> Result<HealthMetrics, OutboundError> {
        let signals = self.collect(subscription).await?;
        let health = self.evaluator.evaluate(&subscription.id, &signals, Utc::now());

        self.metrics
            .emit(
                SUBSCRIPTION_HEALTH_CHECK,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": subscription.customer_id(customer),
                    "overall_health_score": health.overall_health_score,
                    "payment_health": health.payment_health,
                    "fulfillment_health": health.fulfillment_health,
                    "retention_risk": health.retention_risk,
                    "support_health": health.support_health,
                    "evaluated_at": health.evaluated_at,
                }),
            )
            .await?;

        for alert in self.evaluator.alerts(&health) {
            self.raise(&alert).await?;
        }

        tracing::debug!(
            subscription_id = %subscription.id,
            score = health.overall_health_score,
            "Subscription health evaluated"
        );
        Ok(health)
    }

    /// Emit one alert to the analytics sink.
    pub async fn raise(&self, alert: &Alert) -> Result<(), OutboundError> {
        tracing::warn!(
            subscription_id = %alert.subscription_id,
            kind = ?alert.kind,
            severity = ?alert.severity,
            "{}",
            alert.message
        );
        let properties = serde_json::to_value(alert)
            .map_err(|e| OutboundError::transport("analytics", e.to_string()))?;
        self.metrics.emit(SUBSCRIPTION_ALERT, properties).await
    }

    async fn collect(&self, subscription: &Subscription) -> Result<HealthSignals, OutboundError> {
        let (payment, fulfillment, retention, support) = futures::try_join!(
            bounded("health_signals", self.timeout, self.signals.payment_signals(subscription)),
            bounded("health_signals", self.timeout, self.signals.fulfillment_signals(subscription)),
            bounded("health_signals", self.timeout, self.signals.retention_signals(subscription)),
            bounded("health_signals", self.timeout, self.signals.support_signals(subscription)),
        )?;
        Ok(HealthSignals {
            payment,
            fulfillment,
            retention,
            support,
        })
    }
}
