//! LifecycleHandler - one implementation per webhook topic.

use async_trait::async_trait;

use crate::domain::webhook::{WebhookEnvelope, WebhookError, WebhookTopic};

/// Reacts to one webhook topic.
///
/// Handlers hold no per-event state and may run concurrently for different
/// subscriptions. Every outbound failure is returned, never swallowed, so the
/// event source redelivers.
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    /// The topic this handler is registered under.
    fn topic(&self) -> WebhookTopic;

    /// Handler name for logging.
    fn name(&self) -> &'static str;

    /// Whether this envelope should be handled at all. Envelopes that do not
    /// apply are acknowledged without side effects.
    fn applies_to(&self, _envelope: &WebhookEnvelope) -> bool {
        true
    }

    async fn handle(&self, envelope: &WebhookEnvelope) -> Result<(), WebhookError>;
}
