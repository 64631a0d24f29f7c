//! SubscriptionUpdatedHandler - records plan changes and notifies the customer.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use super::handler::LifecycleHandler;
use crate::application::services::{LifecycleServices, RetentionSnapshot};
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{
    SubscriptionUpdatedPayload, WebhookEnvelope, WebhookError, WebhookTopic,
};

pub const SUBSCRIPTION_UPDATED: &str = "subscription_updated";

pub struct SubscriptionUpdatedHandler {
    services: Arc<LifecycleServices>,
}

impl SubscriptionUpdatedHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for SubscriptionUpdatedHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::SubscriptionUpdated
    }

    fn name(&self) -> &'static str {
        "SubscriptionUpdatedHandler"
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let SubscriptionUpdatedPayload {
            customer,
            subscription,
            changes,
        } = envelope.decode()?;
        let services = &self.services;

        services
            .metrics
            .record_lifecycle(
                "updated",
                &subscription,
                &customer,
                json!({ "changes": changes }),
            )
            .await?;

        let health = services.health.check(&subscription, &customer).await?;

        let orders = services.order_history.orders(&subscription.id).await?;
        services
            .metrics
            .record_retention(
                &subscription,
                &customer,
                RetentionSnapshot {
                    orders: &orders,
                    churn_risk_score: Some(health.churn_risk_score()),
                },
                Utc::now(),
            )
            .await?;

        services
            .metrics
            .emit(
                SUBSCRIPTION_UPDATED,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "changes": changes,
                    "new_plan": subscription.plan_name(),
                    "health_score": health.overall_health_score,
                }),
            )
            .await?;

        services
            .notifier
            .send(
                &customer.email,
                EmailTemplate::SubscriptionUpdated,
                json!({
                    "customer_name": customer.first_name,
                    "subscription_details": subscription,
                    "changes": changes,
                    "manage_url": services.notifier.links().manage(&subscription.id),
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
    use crate::application::services::SUBSCRIPTION_RETENTION_METRICS;

    #[tokio::test]
    async fn changes_flow_into_metrics_and_email() {
        let harness = Harness::new();
        let handler = SubscriptionUpdatedHandler::new(harness.services.clone());
        let changes = json!({ "selling_plan": { "from": "Monthly", "to": "Biweekly" } });

        handler
            .handle(&envelope(
                "subscription/updated",
                json!({
                    "customer": customer(),
                    "subscription": subscription("sub_2"),
                    "changes": changes,
                }),
            ))
            .await
            .unwrap();

        let event = &harness.analytics.events_named(SUBSCRIPTION_UPDATED)[0];
        assert_eq!(event.properties["changes"], changes);
        assert_eq!(event.properties["new_plan"], "Monthly Roast");

        let retention = &harness.analytics.events_named(SUBSCRIPTION_RETENTION_METRICS)[0];
        assert_eq!(retention.properties["churn_risk_score"], 0.0);

        let sent = harness.email.sent_with(EmailTemplate::SubscriptionUpdated);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data["changes"], changes);
    }

    #[tokio::test]
    async fn updated_before_created_is_processed_independently() {
        let harness = Harness::new();
        let handler = SubscriptionUpdatedHandler::new(harness.services.clone());

        let result = handler
            .handle(&envelope(
                "subscription/updated",
                json!({ "customer": customer(), "subscription": subscription("sub_new") }),
            ))
            .await;

        assert!(result.is_ok());
        assert_eq!(harness.email.sent().len(), 1);
    }
}
