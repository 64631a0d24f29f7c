//! Webhook topics this system handles.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A supported webhook topic.
///
/// Topics outside this set are acknowledged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookTopic {
    #[serde(rename = "subscription/created")]
    SubscriptionCreated,
    #[serde(rename = "subscription/updated")]
    SubscriptionUpdated,
    #[serde(rename = "subscription/cancelled")]
    SubscriptionCancelled,
    #[serde(rename = "subscription/payment_failure")]
    PaymentFailure,
    #[serde(rename = "subscription/payment_success")]
    PaymentSuccess,
    #[serde(rename = "orders/create")]
    OrderCreated,
}

impl WebhookTopic {
    pub const ALL: [WebhookTopic; 6] = [
        Self::SubscriptionCreated,
        Self::SubscriptionUpdated,
        Self::SubscriptionCancelled,
        Self::PaymentFailure,
        Self::PaymentSuccess,
        Self::OrderCreated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "subscription/created",
            Self::SubscriptionUpdated => "subscription/updated",
            Self::SubscriptionCancelled => "subscription/cancelled",
            Self::PaymentFailure => "subscription/payment_failure",
            Self::PaymentSuccess => "subscription/payment_success",
            Self::OrderCreated => "orders/create",
        }
    }

    /// Exact, case-sensitive match against the topic string.
    pub fn parse(topic: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == topic)
    }
}

impl fmt::Display for WebhookTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
