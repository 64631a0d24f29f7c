//! WebhookDispatcher - routes an envelope to its lifecycle handler.
//!
//! Routing is a table lookup keyed by topic. Adding a topic means registering
//! one more handler; there is no branching on topic strings anywhere else.

use std::collections::HashMap;
use std::sync::Arc;

use crate::application::handlers::lifecycle::{
    LifecycleHandler, PaymentFailureHandler, PaymentSuccessHandler, SubscriptionCancelledHandler,
    SubscriptionCreatedHandler, SubscriptionOrderHandler, SubscriptionUpdatedHandler,
};
use crate::application::services::LifecycleServices;
use crate::domain::webhook::{WebhookEnvelope, WebhookError, WebhookTopic};

/// How an envelope was routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler ran to completion.
    Handled { handler: &'static str },
    /// The topic is known but this envelope does not apply (e.g. a non-subscription order).
    Skipped { topic: WebhookTopic },
    /// No handler is registered for the topic.
    Unrecognized,
}

#[derive(Default)]
pub struct WebhookDispatcher {
    handlers: HashMap<WebhookTopic, Arc<dyn LifecycleHandler>>,
}

impl WebhookDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with every lifecycle handler registered.
    pub fn with_lifecycle_handlers(services: Arc<LifecycleServices>) -> Self {
        Self::new()
            .register(Arc::new(SubscriptionCreatedHandler::new(services.clone())))
            .register(Arc::new(SubscriptionUpdatedHandler::new(services.clone())))
            .register(Arc::new(SubscriptionCancelledHandler::new(services.clone())))
            .register(Arc::new(PaymentFailureHandler::new(services.clone())))
            .register(Arc::new(PaymentSuccessHandler::new(services.clone())))
            .register(Arc::new(SubscriptionOrderHandler::new(services)))
    }

    /// Register a handler under its topic, replacing any previous one.
    pub fn register(mut self, handler: Arc<dyn LifecycleHandler>) -> Self {
        self.handlers.insert(handler.topic(), handler);
        self
    }

    pub fn handles(&self, topic: WebhookTopic) -> bool {
        self.handlers.contains_key(&topic)
    }

    pub async fn dispatch(&self, envelope: &WebhookEnvelope) -> Result<DispatchOutcome, WebhookError> {
        let Some(handler) = WebhookTopic::parse(&envelope.topic).and_then(|t| self.handlers.get(&t))
        else {
            tracing::warn!(topic = %envelope.topic, "Unhandled webhook topic");
            return Ok(DispatchOutcome::Unrecognized);
        };

        if !handler.applies_to(envelope) {
            tracing::debug!(topic = %envelope.topic, handler = handler.name(), "Webhook does not apply, skipping");
            return Ok(DispatchOutcome::Skipped {
                topic: handler.topic(),
            });
        }

        handler.handle(envelope).await.inspect_err(|err| {
            tracing::error!(
                topic = %envelope.topic,
                handler = handler.name(),
                error = %err,
                "Lifecycle handler failed"
            );
        })?;

        Ok(DispatchOutcome::Handled {
            handler: handler.name(),
        })
    }
}
