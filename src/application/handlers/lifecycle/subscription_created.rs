//! SubscriptionCreatedHandler - welcomes a new subscriber.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::handler::LifecycleHandler;
use crate::application::services::LifecycleServices;
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{
    SubscriptionCreatedPayload, WebhookEnvelope, WebhookError, WebhookTopic,
};

pub const SUBSCRIPTION_CREATED: &str = "subscription_created";

pub struct SubscriptionCreatedHandler {
    services: Arc<LifecycleServices>,
}

impl SubscriptionCreatedHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for SubscriptionCreatedHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::SubscriptionCreated
    }

    fn name(&self) -> &'static str {
        "SubscriptionCreatedHandler"
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let SubscriptionCreatedPayload {
            customer,
            subscription,
        } = envelope.decode()?;
        let services = &self.services;

        tracing::info!(
            subscription_id = %subscription.id,
            customer_id = %customer.id,
            "Processing new subscription"
        );

        services
            .metrics
            .record_lifecycle("created", &subscription, &customer, json!({}))
            .await?;

        let health = services.health.check(&subscription, &customer).await?;

        services
            .metrics
            .emit(
                SUBSCRIPTION_CREATED,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "plan_name": subscription.plan_name(),
                    "product_title": subscription.product_title(),
                    "price": subscription.price.map(|p| p.to_major_string()),
                    "currency": subscription.currency,
                    "health_score": health.overall_health_score,
                }),
            )
            .await?;

        services
            .notifier
            .send(
                &customer.email,
                EmailTemplate::SubscriptionWelcome,
                json!({
                    "customer_name": customer.first_name,
                    "subscription_details": subscription,
                    "manage_url": services.notifier.links().manage(&subscription.id),
                }),
            )
            .await?;

        Ok(())
    }
}
