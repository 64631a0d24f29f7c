//! WebhookDeliveryLedger port - Tracks which webhook deliveries were processed.
//!
//! The event source delivers at-least-once. Network timeouts, 5xx responses
//! and lost acknowledgements all produce redeliveries of the same event id.
//! The ledger lets the processor acknowledge a redelivery without repeating
//! retry scheduling, pauses or notifications.
//!
//! ## Protocol
//!
//! 1. `claim` before dispatch. Only `Claimed` proceeds.
//! 2. `complete` after the handler succeeds.
//! 3. `release` after the handler fails, so the redelivery is processed again.
//!
//! A request can be dropped mid-dispatch (boundary timeout, client hang-up)
//! without reaching step 2 or 3. Implementations therefore lease claims: a
//! claim older than the lease is treated as abandoned and can be claimed again.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::webhook::WebhookError;

/// Outcome of claiming a delivery id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimResult {
    /// First time seen; the caller owns processing.
    Claimed,
    /// Already processed successfully.
    AlreadyProcessed { processed_at: DateTime<Utc> },
    /// Claimed by another request whose lease has not expired.
    InFlight,
}

/// A completed delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryRecord {
    pub event_id: String,
    pub topic: String,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LedgerError(pub String);

impl From<LedgerError> for WebhookError {
    fn from(err: LedgerError) -> Self {
        WebhookError::Ledger(err.0)
    }
}

#[async_trait]
pub trait WebhookDeliveryLedger: Send + Sync {
    async fn claim(&self, event_id: &str) -> Result<ClaimResult, LedgerError>;

    async fn complete(&self, event_id: &str, topic: &str) -> Result<(), LedgerError>;

    async fn release(&self, event_id: &str) -> Result<(), LedgerError>;

    async fn find(&self, event_id: &str) -> Result<Option<DeliveryRecord>, LedgerError>;

    /// Drop completed records older than `cutoff`, plus abandoned claims.
    /// Returns how many were removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, LedgerError>;
}
