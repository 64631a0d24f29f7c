//! HealthSignalSource port - Strategy for deriving health signals.
//!
//! Each method supplies the historical aggregate for one health category.
//! The evaluator applies fixed thresholds and weights; how the aggregates
//! are computed (order history, ticketing system, engagement model) is the
//! implementation's business.

use async_trait::async_trait;

use crate::domain::health::{FulfillmentSignals, PaymentSignals, RetentionSignals, SupportSignals};
use crate::domain::subscription::Subscription;
use crate::domain::webhook::OutboundError;

#[async_trait]
pub trait HealthSignalSource: Send + Sync {
    /// Billing failure rate and retry performance.
    async fn payment_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<PaymentSignals, OutboundError>;

    /// Delivery delay frequency and processing times.
    async fn fulfillment_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<FulfillmentSignals, OutboundError>;

    /// Churn risk score in `0..=100`.
    async fn retention_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<RetentionSignals, OutboundError>;

    /// Support responsiveness for the subscription's customer.
    async fn support_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<SupportSignals, OutboundError>;
}
