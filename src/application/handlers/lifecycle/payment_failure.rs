//! PaymentFailureHandler - retry or pause after a failed renewal.
//!
//! Attempts 1-3 schedule a retry 1, 3 or 7 days out and send the "retry
//! scheduled" email. Any later attempt pauses the subscription and sends the
//! "final failure" email. Exactly one branch runs per event.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use super::handler::LifecycleHandler;
use crate::application::services::{LifecycleServices, PaymentAttempt};
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::{PaymentFailurePayload, WebhookEnvelope, WebhookError, WebhookTopic};

pub const SUBSCRIPTION_PAYMENT_FAILED: &str = "subscription_payment_failed";

pub struct PaymentFailureHandler {
    services: Arc<LifecycleServices>,
}

impl PaymentFailureHandler {
    pub fn new(services: Arc<LifecycleServices>) -> Self {
        Self { services }
    }
}

#[async_trait]
impl LifecycleHandler for PaymentFailureHandler {
    fn topic(&self) -> WebhookTopic {
        WebhookTopic::PaymentFailure
    }

    fn name(&self) -> &'static str {
        "PaymentFailureHandler"
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError> {
        let PaymentFailurePayload {
            customer,
            subscription,
            attempt_number,
            failure_reason,
            payment_method,
        } = envelope.decode()?;
        let services = &self.services;

        tracing::info!(
            subscription_id = %subscription.id,
            attempt_number,
            "Processing payment failure"
        );

        services
            .metrics
            .record_lifecycle(
                "payment_failure",
                &subscription,
                &customer,
                json!({
                    "attempt_number": attempt_number,
                    "failure_reason": failure_reason,
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
                    retry_count: attempt_number,
                    failure_reason: failure_reason.as_deref(),
                    success: false,
                },
                services
                    .health
                    .evaluator()
                    .retry_resolution_within_target(&health.payment_health.metrics),
            )
            .await?;

        let outcome = services
            .scheduler
            .handle_failed_attempt(&subscription.id, attempt_number)
            .await?;

        let retry_date = outcome.retry_at();

        services
            .metrics
            .emit(
                SUBSCRIPTION_PAYMENT_FAILED,
                json!({
                    "subscription_id": subscription.id,
                    "customer_id": customer.id,
                    "attempt_number": attempt_number,
                    "failure_reason": failure_reason,
                    "decision": outcome.decision().as_str(),
                    "retry_date": retry_date,
                    "health_score": health.overall_health_score,
                }),
            )
            .await?;

        let update_payment_url = services.notifier.links().update_payment(&subscription.id);
        match retry_date {
            Some(retry_date) => {
                services
                    .notifier
                    .send(
                        &customer.email,
                        EmailTemplate::PaymentRetryScheduled,
                        json!({
                            "customer_name": customer.first_name,
                            "subscription_details": subscription,
                            "failure_reason": failure_reason,
                            "retry_date": retry_date,
                            "update_payment_url": update_payment_url,
                        }),
                    )
                    .await?
            }
            None => {
                services
                    .notifier
                    .send(
                        &customer.email,
                        EmailTemplate::PaymentFailedFinal,
                        json!({
                            "customer_name": customer.first_name,
                            "subscription_details": subscription,
                            "failure_reason": failure_reason,
                            "update_payment_url": update_payment_url,
                        }),
                    )
                    .await?
            }
        }

        Ok(())
    }
}
