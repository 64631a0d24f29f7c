//! CommerceClient port - Outbound mutations and queries against the commerce platform.
//!
//! The commerce platform owns every subscription. This system never writes
//! subscription state directly; it asks the platform to change it.
//!
//! ## Error Semantics
//!
//! A mutation that completes but reports `userErrors` is a failure, exactly
//! like a transport error or timeout. Implementations return
//! `OutboundError::UserErrors` in that case.
//!
//! ## Idempotency
//!
//! Repeated identical mutations are only safe if the platform treats them
//! idempotently. Callers deduplicate deliveries upstream of this port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::subscription::{OrderSummary, SubscriptionStatus, UpcomingRenewal};
use crate::domain::webhook::OutboundError;

/// The subscription as reported back by a successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSnapshot {
    pub id: String,
    pub status: Option<SubscriptionStatus>,
    pub next_billing_date: Option<DateTime<Utc>>,
}

/// Port for the commerce platform's subscription API.
#[async_trait]
pub trait CommerceClient: Send + Sync {
    /// Schedule the next billing attempt for a failed payment.
    async fn schedule_payment_retry(
        &self,
        subscription_id: &str,
        retry_date: DateTime<Utc>,
    ) -> Result<SubscriptionSnapshot, OutboundError>;

    /// Transition the subscription to paused.
    async fn pause_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError>;

    /// Cancel the subscription.
    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError>;

    /// All historical orders billed under the subscription.
    async fn subscription_orders(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<OrderSummary>, OutboundError>;

    /// Active subscriptions whose next billing date falls within `within_days`.
    async fn upcoming_renewals(
        &self,
        within_days: u32,
    ) -> Result<Vec<UpcomingRenewal>, OutboundError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn CommerceClient) {}

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = SubscriptionSnapshot {
            id: "gid://shopify/SubscriptionContract/1".into(),
            status: Some(SubscriptionStatus::Paused),
            next_billing_date: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["status"], "paused");
    }
}
