//! PaymentSuccessHandler - records successful renewals.
//!
//! Only a success that follows a retry gets an email; routine renewals stay quiet.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::handler::LifecycleHandler;
use crate::application::services::{LifecycleServices, PaymentAttempt};
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{PaymentSuccessPayload, WebhookEnvelope, WebhookError, WebhookTopic};

pub const SUBSCRIPTION_PAYMENT_SUCCESS: &str = "subscription_payment_success";

pub struct PaymentSuccessHandler {
    services: Arc<LifecycleServices>,
}

impl PaymentSuccessHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for PaymentSuccessHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::PaymentSuccess
    }

    fn name(&self) -> &'static str {
        "PaymentSuccessHandler"
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let payload: PaymentSuccessPayload = envelope.decode()?;
        let followed_retry = payload.followed_retry();
        let PaymentSuccessPayload {
            customer,
            subscription,
            order,
            retry_attempt,
            payment_method,
        } = payload;
        let services = &self.services;

        services
            .metrics
            .record_lifecycle(
                "payment_success",
                &subscription,
                &customer,
                json!({
                    "retry_attempt": retry_attempt,
                    "payment_method": payment_method,
                }),
            )
            .await?;

        let health = services.health.check(&subscription, &customer).await?;

        services
            .metrics
            .record_payment(
                &subscription,
                &customer,
                PaymentAttempt {
                    payment_method: payment_method.as_deref(),
                    retry_count: retry_attempt.unwrap_or(0),
                    failure_reason: None,
                    success: true,
                },
                services
                    .health
                    .evaluator()
                    .retry_resolution_within_target(&health.payment_health.metrics),
            )
            .await?;

        services
            .metrics
            .emit(
                SUBSCRIPTION_PAYMENT_SUCCESS,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "order_id": order.as_ref().map(|o| o.id.as_str()),
                    "retry_attempt": retry_attempt,
                    "health_score": health.overall_health_score,
                }),
            )
            .await?;

        if followed_retry {
            services
                .notifier
                .send(
                    &customer.email,
                    EmailTemplate::PaymentRetrySuccess,
                    json!({
                        "customer_name": customer.first_name,
                        "subscription_details": subscription,
                        "order_details": order,
                    }),
                )
                .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::lifecycle::testing::{
        customer, envelope, subscription, Harness,
    };

    fn success(retry_attempt: Option<u32>) -> WebhookEnvelope {
        let mut payload = json!({
            "customer": customer(),
            "subscription": subscription("sub_5"),
            "order": { "id": "ord_9", "total_price": "24.00" },
        });
        if let Some(attempt) = retry_attempt {
            payload["retry_attempt"] = json!(attempt);
        }
        envelope("subscription/payment_success", payload)
    }

    #[tokio::test]
    async fn first_attempt_success_sends_no_email() {
        let harness = Harness::new();
        let handler = PaymentSuccessHandler::new(harness.services.clone());

        handler.handle(&success(None)).await.unwrap();

        assert!(harness.email.sent().is_empty());
        let event = &harness.analytics.events_named(SUBSCRIPTION_PAYMENT_SUCCESS)[0];
        assert_eq!(event.properties["order_id"], "ord_9");
        assert!(event.properties["retry_attempt"].is_null());
    }

    #[tokio::test]
    async fn success_after_retry_sends_one_retry_success_email() {
        let harness = Harness::new();
        let handler = PaymentSuccessHandler::new(harness.services.clone());

        handler.handle(&success(Some(2))).await.unwrap();

        let sent = harness.email.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, EmailTemplate::PaymentRetrySuccess);
        assert_eq!(sent[0].data["order_details"]["id"], "ord_9");
    }

    #[tokio::test]
    async fn retry_attempt_zero_counts_as_first_attempt() {
        let harness = Harness::new();
        let handler = PaymentSuccessHandler::new(harness.services.clone());

        handler.handle(&success(Some(0))).await.unwrap();

        assert!(harness.email.sent().is_empty());
    }
}
