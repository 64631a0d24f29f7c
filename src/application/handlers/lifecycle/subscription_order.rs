//! SubscriptionOrderHandler - tracks orders billed under a subscription.
//!
//! Order events without a subscription reference belong to one-off
//! purchases and are acknowledged without side effects.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::handler::LifecycleHandler;
use crate::application::services::LifecycleServices;
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{
    SubscriptionOrderPayload, WebhookEnvelope, WebhookError, WebhookTopic,
};

pub const SUBSCRIPTION_ORDER_CREATED: &str = "subscription_order_created";

pub struct SubscriptionOrderHandler {
    services: Arc<LifecycleServices>,
}

impl SubscriptionOrderHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for SubscriptionOrderHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::OrderCreated
    }

    fn name(&self) -> &'static str {
        "SubscriptionOrderHandler"
    }

    fn applies_to(&self, envelope: &WebhookEnvelope) -> bool {
        match envelope.field("subscription_id") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => false,
            Some(Value::String(id)) => !id.is_empty(),
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(_) => true,
        }
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let SubscriptionOrderPayload {
            customer,
            order,
            subscription,
        } = envelope.decode()?;
        let services = &self.services;

        services
            .metrics
            .record_order(&order, &subscription, &customer)
            .await?;

        let fulfillment = services.fulfillment.check(&order, &subscription.id).await?;

        services
            .metrics
            .emit(
                SUBSCRIPTION_ORDER_CREATED,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "order_id": order.id,
                    "order_total": order.total_price.to_major_string(),
                    "currency": order.currency,
                    "fulfillment_status": fulfillment.shipping_status,
                    "estimated_delivery": fulfillment.delivery_estimate,
                }),
            )
            .await?;

        services
            .notifier
            .send(
                &customer.email,
                EmailTemplate::OrderConfirmation,
                json!({
                    "customer_name": customer.first_name,
                    "order_details": order,
                    "subscription_details": subscription,
                    "order_status_url": order.status_url,
                    "tracking_info": fulfillment.tracking_info,
                }),
            )
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::lifecycle::testing::{
        customer, envelope, subscription, Harness,
    };
    use crate::application::services::{ORDER_FULFILLMENT_CHECK, SUBSCRIPTION_ORDER_TRACKED};

    fn order_event(subscription_id: Value) -> WebhookEnvelope {
        envelope(
            "orders/create",
            json!({
                "subscription_id": subscription_id,
                "customer": customer(),
                "subscription": subscription("sub_6"),
                "order": {
                    "id": "ord_1",
                    "order_number": "#1001",
                    "total_price": "24.00",
                    "currency": "USD",
                    "fulfillment_status": "unfulfilled",
                    "line_items": [{ "title": "House Blend" }],
                    "shipping_lines": [{ "title": "Standard" }],
                    "tracking_info": { "carrier": "UPS", "number": "1Z999" },
                    "status_url": "https://coffee.club/orders/ord_1"
                }
            }),
        )
    }

    #[test]
    fn applies_only_to_subscription_orders() {
        let harness = Harness::new();
        let handler = SubscriptionOrderHandler::new(harness.services.clone());

        assert!(handler.applies_to(&order_event(json!("sub_6"))));
        assert!(handler.applies_to(&order_event(json!(42))));
        assert!(!handler.applies_to(&order_event(Value::Null)));
        assert!(!handler.applies_to(&order_event(json!(""))));
        assert!(!handler.applies_to(&order_event(json!(0))));
        assert!(!handler.applies_to(&order_event(json!(false))));
        assert!(!handler.applies_to(&envelope("orders/create", json!({ "order": {} }))));
    }

    #[tokio::test]
    async fn tracks_order_and_sends_confirmation() {
        let harness = Harness::new();
        let handler = SubscriptionOrderHandler::new(harness.services.clone());

        handler.handle(&order_event(json!("sub_6"))).await.unwrap();

        let tracked = &harness.analytics.events_named(SUBSCRIPTION_ORDER_TRACKED)[0];
        assert_eq!(tracked.properties["order_number"], "#1001");
        assert_eq!(tracked.properties["items_count"], 1);
        assert_eq!(tracked.properties["shipping_method"], "Standard");
        assert!(harness.analytics.has_event(ORDER_FULFILLMENT_CHECK));

        let created = &harness.analytics.events_named(SUBSCRIPTION_ORDER_CREATED)[0];
        assert_eq!(created.properties["order_total"], "24.00");
        assert_eq!(created.properties["fulfillment_status"], "unfulfilled");

        let sent = harness.email.sent_with(EmailTemplate::OrderConfirmation);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data["order_status_url"], "https://coffee.club/orders/ord_1");
        assert_eq!(sent[0].data["tracking_info"]["carrier"], "UPS");
    }
}
