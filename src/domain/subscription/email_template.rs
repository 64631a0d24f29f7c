//! Notification email templates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every notification this system can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailTemplate {
    SubscriptionWelcome,
    SubscriptionUpdated,
    SubscriptionCancelled,
    PaymentRetryScheduled,
    PaymentFailedFinal,
    PaymentRetrySuccess,
    SubscriptionRenewalReminder,
    OrderConfirmation,
}

/// Raised when a template key does not name a known template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Email template '{0}' not found")]
pub struct TemplateNotFound(pub String);

impl EmailTemplate {
    pub const ALL: [EmailTemplate; 8] = [
        Self::SubscriptionWelcome,
        Self::SubscriptionUpdated,
        Self::SubscriptionCancelled,
        Self::PaymentRetryScheduled,
        Self::PaymentFailedFinal,
        Self::PaymentRetrySuccess,
        Self::SubscriptionRenewalReminder,
        Self::OrderConfirmation,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::SubscriptionWelcome => "subscription_welcome",
            Self::SubscriptionUpdated => "subscription_updated",
            Self::SubscriptionCancelled => "subscription_cancelled",
            Self::PaymentRetryScheduled => "payment_retry_scheduled",
            Self::PaymentFailedFinal => "payment_failed_final",
            Self::PaymentRetrySuccess => "payment_retry_success",
            Self::SubscriptionRenewalReminder => "subscription_renewal_reminder",
            Self::OrderConfirmation => "order_confirmation",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            Self::SubscriptionWelcome => "Welcome to Your Subscription!",
            Self::SubscriptionUpdated => "Your Subscription Has Been Updated",
            Self::SubscriptionCancelled => "Your Subscription Has Been Cancelled",
            Self::PaymentRetryScheduled => "Action Required: Payment Retry Scheduled",
            Self::PaymentFailedFinal => "Important: Subscription Paused Due to Payment Failure",
            Self::PaymentRetrySuccess => "Good News: Payment Successfully Processed",
            Self::SubscriptionRenewalReminder => "Your Subscription Renewal is Coming Up",
            Self::OrderConfirmation => "Your Subscription Order Has Been Processed",
        }
    }

    pub fn from_key(key: &str) -> Result<Self, TemplateNotFound> {
        Self::ALL
            .into_iter()
            .find(|template| template.key() == key)
            .ok_or_else(|| TemplateNotFound(key.to_string()))
    }
}

impl FromStr for EmailTemplate {
    type Err = TemplateNotFound;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl fmt::Display for EmailTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
