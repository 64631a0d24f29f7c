//! SubscriptionCancelledHandler - final retention figures and a farewell email.
//!
//! Cancellation is terminal, so no health evaluation runs here.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::handler::LifecycleHandler;
use crate::application::services::{LifecycleServices, RetentionSnapshot};
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{
    SubscriptionCancelledPayload, WebhookEnvelope, WebhookError, WebhookTopic,
};

pub const SUBSCRIPTION_CANCELLED: &str = "subscription_cancelled";

pub struct SubscriptionCancelledHandler {
    services: Arc<LifecycleServices>,
}

impl SubscriptionCancelledHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for SubscriptionCancelledHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::SubscriptionCancelled
    }

    fn name(&self) -> &'static str {
        "SubscriptionCancelledHandler"
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let SubscriptionCancelledPayload {
            customer,
            subscription,
            reason,
        } = envelope.decode()?;
        let services = &self.services;
        let now = Utc::now();

        services
            .metrics
            .record_lifecycle(
                "cancelled",
                &subscription,
                &customer,
                json!({ "reason": reason }),
            )
            .await?;

        let orders = services.order_history.orders(&subscription.id).await?;
        let lifetime_value = services
            .metrics
            .record_retention(
                &subscription,
                &customer,
                RetentionSnapshot {
                    orders: &orders,
                    churn_risk_score: None,
                },
                now,
            )
            .await?;

        services
            .metrics
            .emit(
                SUBSCRIPTION_CANCELLED,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "reason": reason,
                    "cancelled_at": now,
                    "lifetime_value": lifetime_value.to_major_string(),
                    "total_orders": orders.len(),
                }),
            )
            .await?;

        services
            .notifier
            .send(
                &customer.email,
                EmailTemplate::SubscriptionCancelled,
                json!({
                    "customer_name": customer.first_name,
                    "subscription_details": subscription,
                    "reactivate_url": services.notifier.links().reactivate(&subscription.id),
                }),
            )
            .await?;

        tracing::info!(
            subscription_id = %subscription.id,
            lifetime_value = %lifetime_value,
            "Subscription cancellation processed"
        );
        Ok(())
    }
}
