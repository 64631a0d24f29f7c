//! In-memory webhook delivery ledger.
//!
//! Suitable for a single process. Entries live until purged; a background
//! task in `main` purges completed records past the retention window and
//! claims whose lease ran out.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::ports::{ClaimResult, DeliveryRecord, LedgerError, WebhookDeliveryLedger};

#[derive(Debug, Clone)]
enum Entry {
    InFlight { claimed_at: DateTime<Utc> },
    Completed(DeliveryRecord),
}

#[derive(Debug)]
pub struct InMemoryDeliveryLedger {
    entries: RwLock<HashMap<String, Entry>>,
    claim_lease: Duration,
}

impl Default for InMemoryDeliveryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDeliveryLedger {
    /// Ledger with a ten minute claim lease.
    pub fn new() -> Self {
        Self::with_claim_lease(Duration::minutes(10))
    }

    pub fn with_claim_lease(claim_lease: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            claim_lease,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn lease_expired(&self, claimed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        claimed_at + self.claim_lease <= now
    }
}

#[async_trait]
impl WebhookDeliveryLedger for InMemoryDeliveryLedger {
    async fn claim(&self, event_id: &str) -> Result<ClaimResult, LedgerError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        match entries.get(event_id) {
            Some(Entry::Completed(record)) => {
                return Ok(ClaimResult::AlreadyProcessed {
                    processed_at: record.processed_at,
                })
            }
            Some(Entry::InFlight { claimed_at }) if !self.lease_expired(*claimed_at, now) => {
                return Ok(ClaimResult::InFlight)
            }
            Some(Entry::InFlight { claimed_at }) => {
                tracing::warn!(
                    webhook_id = event_id,
                    claimed_at = %claimed_at,
                    "Taking over abandoned delivery claim"
                );
            }
            None => {}
        }
        entries.insert(event_id.to_string(), Entry::InFlight { claimed_at: now });
        Ok(ClaimResult::Claimed)
    }

    async fn complete(&self, event_id: &str, topic: &str) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().await;
        entries.insert(
            event_id.to_string(),
            Entry::Completed(DeliveryRecord {
                event_id: event_id.to_string(),
                topic: topic.to_string(),
                processed_at: Utc::now(),
            }),
        );
        Ok(())
    }

    async fn release(&self, event_id: &str) -> Result<(), LedgerError> {
        let mut entries = self.entries.write().await;
        if matches!(entries.get(event_id), Some(Entry::InFlight { .. })) {
            entries.remove(event_id);
        }
        Ok(())
    }

    async fn find(&self, event_id: &str) -> Result<Option<DeliveryRecord>, LedgerError> {
        let entries = self.entries.read().await;
        Ok(match entries.get(event_id) {
            Some(Entry::Completed(record)) => Some(record.clone()),
            _ => None,
        })
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, LedgerError> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| match entry {
            Entry::Completed(record) => record.processed_at >= cutoff,
            Entry::InFlight { claimed_at } => {
                *claimed_at >= cutoff && !self.lease_expired(*claimed_at, now)
            }
        });
        Ok((before - entries.len()) as u64)
    }
}
