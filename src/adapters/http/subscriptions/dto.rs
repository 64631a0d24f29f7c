//! Request and response bodies for subscription endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::handlers::subscription::{ReminderSent, SendRenewalRemindersResult};
use crate::ports::SubscriptionSnapshot;

/// Largest reminder window accepted from a caller.
pub const MAX_RENEWAL_WINDOW_DAYS: u32 = 30;

// ════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /renewal-reminders`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenewalRemindersRequest {
    /// Override the configured look-ahead window.
    #[serde(default)]
    pub within_days: Option<u32>,
}

impl RenewalRemindersRequest {
    /// Returns the offending value if the window is outside `1..=30`.
    pub fn invalid_window(&self) -> Option<u32> {
        self.within_days
            .filter(|days| *days == 0 || *days > MAX_RENEWAL_WINDOW_DAYS)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalReminderDetail {
    pub subscription_id: String,
    pub customer_id: String,
    pub days_until_renewal: i64,
}

impl From<ReminderSent> for RenewalReminderDetail {
    fn from(sent: ReminderSent) -> Self {
        Self {
            subscription_id: sent.subscription_id,
            customer_id: sent.customer_id,
            days_until_renewal: sent.days_until_renewal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalRemindersResponse {
    pub window_days: u32,
    pub sent: usize,
    pub failed: usize,
    pub details: Vec<RenewalReminderDetail>,
}

impl From<SendRenewalRemindersResult> for RenewalRemindersResponse {
    fn from(result: SendRenewalRemindersResult) -> Self {
        Self {
            window_days: result.window_days,
            sent: result.sent,
            failed: result.failed,
            details: result.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelSubscriptionResponse {
    pub subscription_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_billing_date: Option<DateTime<Utc>>,
}

impl From<SubscriptionSnapshot> for CancelSubscriptionResponse {
    fn from(snapshot: SubscriptionSnapshot) -> Self {
        Self {
            subscription_id: snapshot.id,
            status: snapshot.status.map(|s| s.as_str().to_string()),
            next_billing_date: snapshot.next_billing_date,
        }
    }
}
