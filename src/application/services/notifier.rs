//! Customer notifications with account deep links.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::outbound::bounded;
use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::OutboundError;
use crate::ports::EmailSender;

/// Links back into the customer's account pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountLinks {
    base_url: String,
}

impl AccountLinks {
    pub fn new(public_url: &str) -> Self {
        Self {
            base_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn manage(&self, subscription_id: &str) -> String {
        format!("{}/account/subscriptions/{}", self.base_url, subscription_id)
    }

    pub fn reactivate(&self, subscription_id: &str) -> String {
        format!("{}/reactivate", self.manage(subscription_id))
    }

    pub fn update_payment(&self, subscription_id: &str) -> String {
        format!("{}/payment", self.manage(subscription_id))
    }
}

#[derive(Clone)]
pub struct Notifier {
    email: Arc<dyn EmailSender>,
    links: AccountLinks,
    timeout: Duration,
}

impl Notifier {
    pub fn new(email: Arc<dyn EmailSender>, links: AccountLinks, timeout: Duration) -> Self {
        Self { email, links, timeout }
    }

    pub fn links(&self) -> &AccountLinks {
        &self.links
    }

    pub async fn send(&self, to: &str, template: EmailTemplate, data: Value) -> Result<(), OutboundError> {
        bounded("email", self.timeout, self.email.send_email(to, template, data)).await?;
        tracing::debug!(template = template.key(), "Notification dispatched");
        Ok(())
    }
}
