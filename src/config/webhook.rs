//! Inbound webhook configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::webhook::DEFAULT_SIGNATURE_HEADER;

/// Longest configurable delivery-id retention (90 days).
pub const MAX_LEDGER_RETENTION_HOURS: u64 = 90 * 24;

/// Longest configurable in-flight claim lease (one day).
pub const MAX_CLAIM_LEASE_SECS: u64 = 24 * 60 * 60;

/// Webhook verification and delivery-ledger settings
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    /// Shared HMAC secret. Deliveries are rejected while unset.
    #[serde(default)]
    pub secret: Option<SecretString>,

    /// Header carrying the base64 HMAC of the raw body
    #[serde(default = "default_signature_header")]
    pub signature_header: String,

    /// Acknowledge redelivered event ids without reprocessing
    #[serde(default = "default_dedupe")]
    pub dedupe_deliveries: bool,

    /// How long completed delivery ids are remembered
    #[serde(default = "default_ledger_retention_hours")]
    pub ledger_retention_hours: u64,

    /// How long an unfinished claim blocks redeliveries before it can be
    /// taken over
    #[serde(default = "default_claim_lease_secs")]
    pub claim_lease_secs: u64,
}

impl WebhookConfig {
    pub fn has_secret(&self) -> bool {
        self.secret
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty())
    }

    /// Validate webhook configuration
    ///
    /// A missing secret is only an error in production. Elsewhere the
    /// verifier still fails closed, so every delivery gets a 401.
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        if is_production && !self.has_secret() {
            return Err(ValidationError::MissingRequired("WEBHOOK__SECRET"));
        }
        if self.signature_header.trim().is_empty() {
            return Err(ValidationError::EmptySignatureHeader);
        }
        if self.ledger_retention_hours == 0 || self.ledger_retention_hours > MAX_LEDGER_RETENTION_HOURS {
            return Err(ValidationError::InvalidLedgerRetention);
        }
        if self.claim_lease_secs == 0 || self.claim_lease_secs > MAX_CLAIM_LEASE_SECS {
            return Err(ValidationError::InvalidClaimLease);
        }
        Ok(())
    }

    pub fn ledger_retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.ledger_retention_hours.min(MAX_LEDGER_RETENTION_HOURS) as i64)
    }

    pub fn claim_lease(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.claim_lease_secs.min(MAX_CLAIM_LEASE_SECS) as i64)
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            signature_header: default_signature_header(),
            dedupe_deliveries: default_dedupe(),
            ledger_retention_hours: default_ledger_retention_hours(),
            claim_lease_secs: default_claim_lease_secs(),
        }
    }
}

fn default_signature_header() -> String {
    DEFAULT_SIGNATURE_HEADER.to_string()
}

fn default_dedupe() -> bool {
    true
}

fn default_ledger_retention_hours() -> u64 {
    72
}

fn default_claim_lease_secs() -> u64 {
    600
}
