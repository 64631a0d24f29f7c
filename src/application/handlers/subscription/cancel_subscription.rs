//! CancelSubscriptionHandler - customer-initiated cancellation.
//!
//! Issues the cancel mutation only. The follow-up email and retention figures
//! come from the `subscription/cancelled` webhook the platform sends back.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::application::services::bounded;
use crate::domain::webhook::OutboundError;
use crate::ports::{CommerceClient, SubscriptionSnapshot};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: String,
}

#[derive(Debug, Error)]
pub enum CancelSubscriptionError {
    #[error("Subscription id must not be empty")]
    InvalidSubscriptionId,

    #[error("Failed to cancel subscription: {0}")]
    Commerce(#[from] OutboundError),
}

pub struct CancelSubscriptionHandler {
    commerce: Arc<dyn CommerceClient>,
    timeout: Duration,
}

impl CancelSubscriptionHandler {
    pub fn new(commerce: Arc<dyn CommerceClient>, timeout: Duration) -> Self {
        Self { commerce, timeout }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<SubscriptionSnapshot, CancelSubscriptionError> {
        let subscription_id = cmd.subscription_id.trim();
        if subscription_id.is_empty() {
            return Err(CancelSubscriptionError::InvalidSubscriptionId);
        }

        let snapshot = bounded(
            "commerce",
            self.timeout,
            self.commerce.cancel_subscription(subscription_id),
        )
        .await
        .inspect_err(|err| {
            tracing::error!(subscription_id, error = %err, "Subscription cancellation failed");
        })?;

        tracing::info!(subscription_id, "Subscription cancelled");
        Ok(snapshot)
    }
}
