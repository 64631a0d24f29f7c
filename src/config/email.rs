//! Email configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::subscription::EmailTemplate;

/// Email configuration (SendGrid)
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SendGrid API key
    pub api_key: SecretString,

    /// API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// From email address
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From name, also used as the company name in templates
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Support address shown in every template
    #[serde(default = "default_support_email")]
    pub support_email: String,

    /// Help center link shown in every template. Defaults to `{public_url}/help`.
    #[serde(default)]
    pub help_center_url: Option<String>,

    /// Provider template id per notification
    #[serde(default)]
    pub templates: EmailTemplateIds,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Provider template ids, one per notification
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmailTemplateIds {
    pub subscription_welcome: Option<String>,
    pub subscription_updated: Option<String>,
    pub subscription_cancelled: Option<String>,
    pub payment_retry_scheduled: Option<String>,
    pub payment_failed_final: Option<String>,
    pub payment_retry_success: Option<String>,
    pub subscription_renewal_reminder: Option<String>,
    pub order_confirmation: Option<String>,
}

impl EmailTemplateIds {
    pub fn get(&self, template: EmailTemplate) -> Option<&str> {
        let id = match template {
            EmailTemplate::SubscriptionWelcome => &self.subscription_welcome,
            EmailTemplate::SubscriptionUpdated => &self.subscription_updated,
            EmailTemplate::SubscriptionCancelled => &self.subscription_cancelled,
            EmailTemplate::PaymentRetryScheduled => &self.payment_retry_scheduled,
            EmailTemplate::PaymentFailedFinal => &self.payment_failed_final,
            EmailTemplate::PaymentRetrySuccess => &self.payment_retry_success,
            EmailTemplate::SubscriptionRenewalReminder => &self.subscription_renewal_reminder,
            EmailTemplate::OrderConfirmation => &self.order_confirmation,
        };
        id.as_deref().filter(|id| !id.is_empty())
    }

    /// Templates with no provider id configured
    pub fn missing(&self) -> Vec<EmailTemplate> {
        EmailTemplate::ALL
            .into_iter()
            .filter(|template| self.get(*template).is_none())
            .collect()
    }
}

impl EmailConfig {
    /// Validate email configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__API_KEY"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        if !self.support_email.contains('@') {
            return Err(ValidationError::InvalidSupportEmail);
        }
        if self.timeout_ms == 0 || self.timeout_ms > 60_000 {
            return Err(ValidationError::InvalidOutboundTimeout("email"));
        }
        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

fn default_from_email() -> String {
    "noreply@example.com".to_string()
}

fn default_from_name() -> String {
    "Subscription Team".to_string()
}

fn default_support_email() -> String {
    "support@example.com".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}
