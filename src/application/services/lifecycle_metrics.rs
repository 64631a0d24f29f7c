//! Lifecycle metrics recorder.
//!
//! Builds the standard metric bundles for subscription, payment, order and
//! retention events and hands them to the analytics tracker. Every call is
//! bounded and its failure returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use super::outbound::bounded;
use crate::domain::subscription::{
    lifetime_value, Customer, MinorUnits, Order, OrderSummary, Subscription,
};
use crate::domain::webhook::OutboundError;
use crate::ports::AnalyticsTracker;

pub const SUBSCRIPTION_LIFECYCLE: &str = "subscription_lifecycle";
pub const SUBSCRIPTION_PAYMENT_METRICS: &str = "subscription_payment_metrics";
pub const SUBSCRIPTION_ORDER_TRACKED: &str = "subscription_order_tracked";
pub const SUBSCRIPTION_RETENTION_METRICS: &str = "subscription_retention_metrics";

/// Inputs to the payment metric bundle that come from the event itself.
#[derive(Debug, Clone, Default)]
pub struct PaymentAttempt<'a> {
    pub payment_method: Option<&'a str>,
    pub retry_count: u32,
    pub failure_reason: Option<&'a str>,
    pub success: bool,
}

/// Churn and history figures for the retention bundle.
#[derive(Debug, Clone)]
pub struct RetentionSnapshot<'a> {
    pub orders: &'a [OrderSummary],
    pub churn_risk_score: Option<f64>,
}

#[derive(Clone)]
pub struct LifecycleMetrics {
    analytics: Arc<dyn AnalyticsTracker>,
    timeout: Duration,
}

impl LifecycleMetrics {
    pub fn new(analytics: Arc<dyn AnalyticsTracker>, timeout: Duration) -> Self {
        Self { analytics, timeout }
    }

    /// Emit an arbitrary analytics event under the analytics time budget.
    pub async fn emit(&self, name: &str, properties: Value) -> Result<(), OutboundError> {
        bounded("analytics", self.timeout, self.analytics.track_event(name, properties)).await
    }

    /// Record a lifecycle transition with the standard subscription bundle.
    ///
    /// `extras` must be a JSON object; its fields are appended to the bundle.
    pub async fn record_lifecycle(
        &self,
        lifecycle_event: &str,
        subscription: &Subscription,
        customer: &Customer,
        extras: Value,
    ) -> Result<(), OutboundError> {
        let mut bundle = subscription_bundle(subscription, customer);
        bundle.insert("lifecycle_event".into(), json!(lifecycle_event));
        if let Value::Object(fields) = extras {
            bundle.extend(fields);
        }
        self.emit(SUBSCRIPTION_LIFECYCLE, Value::Object(bundle)).await
    }

    pub async fn record_payment(
        &self,
        subscription: &Subscription,
        customer: &Customer,
        attempt: PaymentAttempt<'_>,
        retry_resolution_within_target: Option<bool>,
    ) -> Result<(), OutboundError> {
        self.emit(
            SUBSCRIPTION_PAYMENT_METRICS,
            json!({
                "subscription_id": subscription.id,
                "customer_id": subscription.customer_id(customer),
                "payment_method": attempt.payment_method,
                "retry_count": attempt.retry_count,
                "last_failure_reason": attempt.failure_reason,
                "success": attempt.success,
                "retry_resolution_within_target": retry_resolution_within_target,
            }),
        )
        .await
    }

    pub async fn record_order(
        &self,
        order: &Order,
        subscription: &Subscription,
        customer: &Customer,
    ) -> Result<(), OutboundError> {
        self.emit(
            SUBSCRIPTION_ORDER_TRACKED,
            json!({
                "order_id": order.id,
                "subscription_id": subscription.id,
                "customer_id": order
                    .customer
                    .as_ref()
                    .map(|c| c.id.as_str())
                    .unwrap_or_else(|| subscription.customer_id(customer)),
                "order_number": order.order_number,
                "total_price": order.total_price.to_major_string(),
                "currency": order.currency,
                "payment_status": order.financial_status,
                "fulfillment_status": order.fulfillment_status,
                "items_count": order.line_items.len(),
                "shipping_method": order.shipping_method(),
                "estimated_delivery_date": order.estimated_delivery_at,
                "actual_delivery_date": order.delivered_at,
                "is_subscription_order": true,
            }),
        )
        .await
    }

    /// Record retention figures. Returns the lifetime value that was reported.
    pub async fn record_retention(
        &self,
        subscription: &Subscription,
        customer: &Customer,
        snapshot: RetentionSnapshot<'_>,
        now: DateTime<Utc>,
    ) -> Result<MinorUnits, OutboundError> {
        let lifetime_value = lifetime_value(snapshot.orders);
        self.emit(
            SUBSCRIPTION_RETENTION_METRICS,
            json!({
                "subscription_id": subscription.id,
                "customer_id": subscription.customer_id(customer),
                "lifetime_value": lifetime_value.to_major_string(),
                "total_orders": snapshot.orders.len(),
                "subscription_age_days": subscription.age_days(now),
                "churn_risk_score": snapshot.churn_risk_score,
                "last_order_date": subscription.last_order_date,
                "next_order_date": subscription.next_billing_date,
            }),
        )
        .await?;
        Ok(lifetime_value)
    }
}

fn subscription_bundle(subscription: &Subscription, customer: &Customer) -> Map<String, Value> {
    let bundle = json!({
        "subscription_id": subscription.id,
        "customer_id": subscription.customer_id(customer),
        "plan_name": subscription.plan_name(),
        "product_title": subscription.product_title(),
        "price": subscription.price.map(|p| p.to_major_string()),
        "currency": subscription.currency,
        "billing_interval": subscription.billing_interval(),
        "billing_interval_count": subscription.billing_interval_count(),
        "status": subscription.status.map(|s| s.as_str()),
        "created_at": subscription.created_at,
    });
    match bundle {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::analytics::RecordingAnalyticsTracker;

    fn subscription() -> Subscription {
        serde_json::from_value(json!({
            "id": "s1",
            "customer": { "id": "c-nested" },
            "status": "active",
            "selling_plan": {
                "name": "Monthly Roast",
                "deliveryPolicy": { "interval": "MONTH", "intervalCount": 1 }
            },
            "line_items": [{ "title": "House Blend" }],
            "price": "24.00",
            "currency": "USD",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn customer() -> Customer {
        Customer {
            id: "c1".into(),
            email: "c1@example.com".into(),
            first_name: Some("Ada".into()),
        }
    }

    fn recorder() -> (Arc<RecordingAnalyticsTracker>, LifecycleMetrics) {
        let tracker = Arc::new(RecordingAnalyticsTracker::new());
        let metrics = LifecycleMetrics::new(tracker.clone(), Duration::from_secs(1));
        (tracker, metrics)
    }

    #[tokio::test]
    async fn lifecycle_bundle_carries_standard_fields_and_extras() {
        let (tracker, metrics) = recorder();
        metrics
            .record_lifecycle("updated", &subscription(), &customer(), json!({ "changes": { "price": "26.00" } }))
            .await
            .unwrap();

        let event = &tracker.events_named(SUBSCRIPTION_LIFECYCLE)[0];
        let props = &event.properties;
        assert_eq!(props["lifecycle_event"], "updated");
        assert_eq!(props["customer_id"], "c-nested");
        assert_eq!(props["plan_name"], "Monthly Roast");
        assert_eq!(props["product_title"], "House Blend");
        assert_eq!(props["price"], "24.00");
        assert_eq!(props["billing_interval"], "MONTH");
        assert_eq!(props["billing_interval_count"], 1);
        assert_eq!(props["status"], "active");
        assert_eq!(props["changes"]["price"], "26.00");
    }

    #[tokio::test]
    async fn retention_reports_lifetime_value() {
        let (tracker, metrics) = recorder();
        let orders = vec![
            OrderSummary { id: "o1".into(), total_price: MinorUnits::new(2400), created_at: None },
            OrderSummary { id: "o2".into(), total_price: MinorUnits::new(2650), created_at: None },
        ];

        let ltv = metrics
            .record_retention(
                &subscription(),
                &customer(),
                RetentionSnapshot { orders: &orders, churn_risk_score: None },
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(ltv, MinorUnits::new(5050));
        let props = &tracker.events_named(SUBSCRIPTION_RETENTION_METRICS)[0].properties;
        assert_eq!(props["lifetime_value"], "50.50");
        assert_eq!(props["total_orders"], 2);
        assert!(props["churn_risk_score"].is_null());
    }

    #[tokio::test]
    async fn tracker_failure_is_returned() {
        let tracker = Arc::new(
            RecordingAnalyticsTracker::new()
                .fail_event(SUBSCRIPTION_LIFECYCLE, OutboundError::transport("analytics", "down")),
        );
        let metrics = LifecycleMetrics::new(tracker, Duration::from_secs(1));

        let result = metrics
            .record_lifecycle("created", &subscription(), &customer(), json!({}))
            .await;
        assert!(matches!(result, Err(OutboundError::Transport { .. })));
    }
}
