//! SendRenewalRemindersHandler - reminds customers of upcoming renewals.
//!
//! Meant to be triggered once a day by an external scheduler. A failed send
//! for one customer is counted and logged without stopping the batch.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::application::services::{bounded, Notifier};
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::OutboundError;
use crate::ports::CommerceClient;

#[derive(Debug, Clone, Copy, Default)]
pub struct SendRenewalRemindersCommand {
    /// Look-ahead window in days. Falls back to the configured default.
    pub within_days: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderSent {
    pub subscription_id: String,
    pub customer_id: String,
    pub days_until_renewal: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRenewalRemindersResult {
    pub window_days: u32,
    pub sent: usize,
    pub failed: usize,
    pub details: Vec<ReminderSent>,
}

pub struct SendRenewalRemindersHandler {
    commerce: Arc<dyn CommerceClient>,
    notifier: Notifier,
    default_window_days: u32,
    commerce_timeout: Duration,
}

impl SendRenewalRemindersHandler {
    pub fn new(
        commerce: Arc<dyn CommerceClient>,
        notifier: Notifier,
        default_window_days: u32,
        commerce_timeout: Duration,
    ) -> Self {
        Self {
            commerce,
            notifier,
            default_window_days,
            commerce_timeout,
        }
    }

    /// # Errors
    ///
    /// Fails only when the renewal query itself fails.
    pub async fn handle(
        &self,
        cmd: SendRenewalRemindersCommand,
    ) -> Result<SendRenewalRemindersResult, OutboundError> {
        let window_days = cmd.within_days.unwrap_or(self.default_window_days);
        let renewals = bounded(
            "commerce",
            self.commerce_timeout,
            self.commerce.upcoming_renewals(window_days),
        )
        .await?;

        let now = Utc::now();
        let mut details = Vec::with_capacity(renewals.len());
        let mut failed = 0;

        for renewal in renewals {
            let days_until_renewal = renewal.days_until_renewal(now);
            let sent = self
                .notifier
                .send(
                    &renewal.customer.email,
                    EmailTemplate::SubscriptionRenewalReminder,
                    json!({
                        "customer_name": renewal.customer.first_name,
                        "subscription_details": {
                            "product_title": renewal.product_title,
                            "next_billing_date": renewal.next_billing_date,
                            "price": renewal.price.map(|p| p.to_major_string()),
                            "days_until_renewal": days_until_renewal,
                        },
                        "manage_url": self.notifier.links().manage(&renewal.subscription_id),
                    }),
                )
                .await;

            match sent {
                Ok(()) => details.push(ReminderSent {
                    subscription_id: renewal.subscription_id,
                    customer_id: renewal.customer.id,
                    days_until_renewal,
                }),
                Err(err) => {
                    failed += 1;
                    tracing::error!(
                        subscription_id = %renewal.subscription_id,
                        error = %err,
                        "Failed to send renewal reminder"
                    );
                }
            }
        }

        tracing::info!(window_days, sent = details.len(), failed, "Renewal reminders processed");
        Ok(SendRenewalRemindersResult {
            window_days,
            sent: details.len(),
            failed,
            details,
        })
    }
}
