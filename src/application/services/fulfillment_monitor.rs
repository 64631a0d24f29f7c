//! Fulfillment monitor for subscription orders.

use chrono::Utc;
use serde_json::json;

use super::health_monitor::HealthMonitor;
use super::lifecycle_metrics::LifecycleMetrics;
use crate::domain::health::FulfillmentCheck;
use crate::domain::subscription::Order;
use crate::domain::webhook::OutboundError;

pub const ORDER_FULFILLMENT_CHECK: &str = "order_fulfillment_check";

#[derive(Clone)]
pub struct FulfillmentMonitor {
    metrics: LifecycleMetrics,
    health: HealthMonitor,
}

impl FulfillmentMonitor {
    pub fn new(metrics: LifecycleMetrics, health: HealthMonitor) -> Self {
        Self { metrics, health }
    }

    /// Check an order against its delivery estimate, alerting when it is late.
    pub async fn check(
        &self,
        order: &Order,
        subscription_id: &str,
    ) -> Result<FulfillmentCheck, OutboundError> {
        let delay_threshold = self.health.evaluator().thresholds().delivery_delay_days;
        let check = FulfillmentCheck::from_order(order, subscription_id, delay_threshold, Utc::now());

        self.metrics
            .emit(
                ORDER_FULFILLMENT_CHECK,
                json!({
                    "order_id": check.order_id,
                    "subscription_id": check.subscription_id,
                    "shipping_status": check.shipping_status,
                    "delivery_estimate": check.delivery_estimate,
                    "processing_hours": check.processing_hours,
                    "delay_days": check.delay_days,
                    "delayed": check.delayed,
                }),
            )
            .await?;

        if let Some(alert) = check.alert() {
            self.health.raise(&alert).await?;
        }
        Ok(check)
    }
}
