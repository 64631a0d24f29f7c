//! SendGrid email sender.
//!
//! Sends dynamic-template mail through the v3 mail send API. Every message
//! carries the template subject and the shared footer data (support address,
//! company name, help center link, current year) underneath the caller's data.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};

use crate::config::{EmailConfig, EmailTemplateIds};
use crate::domain::subscription::{EmailTemplate, TemplateNotFound};
use crate::domain::webhook::OutboundError;
use crate::ports::EmailSender;

const SERVICE: &str = "email";

/// `EmailSender` backed by SendGrid dynamic templates.
pub struct SendGridEmailSender {
    api_key: SecretString,
    send_url: String,
    from_email: String,
    from_name: String,
    support_email: String,
    help_center_url: String,
    templates: EmailTemplateIds,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl SendGridEmailSender {
    /// Build a sender from configuration.
    ///
    /// `help_center_url` is resolved by the caller since it may fall back to
    /// the public site URL.
    pub fn new(config: &EmailConfig, help_center_url: String) -> Result<Self, OutboundError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OutboundError::transport(SERVICE, e.to_string()))?;

        let missing = config.templates.missing();
        if !missing.is_empty() {
            tracing::warn!(
                missing = ?missing.iter().map(EmailTemplate::key).collect::<Vec<_>>(),
                "Email templates without a provider id will fail to send"
            );
        }

        Ok(Self {
            api_key: config.api_key.clone(),
            send_url: format!("{}/v3/mail/send", config.api_base_url.trim_end_matches('/')),
            from_email: config.from_email.clone(),
            from_name: config.from_name.clone(),
            support_email: config.support_email.clone(),
            help_center_url,
            templates: config.templates.clone(),
            http_client,
            timeout,
        })
    }

    fn template_data(&self, template: EmailTemplate, data: Value) -> Value {
        let mut merged = Map::new();
        merged.insert("subject".into(), json!(template.subject()));
        merged.insert("support_email".into(), json!(self.support_email));
        merged.insert("company_name".into(), json!(self.from_name));
        merged.insert("help_center_url".into(), json!(self.help_center_url));
        merged.insert("current_year".into(), json!(Utc::now().year()));

        if let Value::Object(fields) = data {
            merged.extend(fields);
        }
        Value::Object(merged)
    }

    fn message(&self, to: &str, template_id: &str, template: EmailTemplate, data: Value) -> Value {
        json!({
            "personalizations": [{
                "to": [{ "email": to }],
                "dynamic_template_data": self.template_data(template, data),
            }],
            "from": { "email": self.from_email, "name": self.from_name },
            "template_id": template_id,
        })
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    async fn send_email(
        &self,
        to: &str,
        template: EmailTemplate,
        data: Value,
    ) -> Result<(), OutboundError> {
        let template_id = self
            .templates
            .get(template)
            .ok_or_else(|| TemplateNotFound(template.key().to_string()))?;

        let response = self
            .http_client
            .post(&self.send_url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.message(to, template_id, template, data))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OutboundError::Timeout {
                        service: SERVICE,
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    OutboundError::transport(SERVICE, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(template = template.key(), status = status.as_u16(), "Email send rejected");
            return Err(OutboundError::rejected(SERVICE, status.as_u16(), body));
        }

        tracing::info!(template = template.key(), "Email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EmailConfig {
        EmailConfig {
            api_key: SecretString::new("SG.test".to_string()),
            api_base_url: "https://api.sendgrid.test/".to_string(),
            from_email: "orders@coffee.club".to_string(),
            from_name: "Coffee Club".to_string(),
            support_email: "help@coffee.club".to_string(),
            help_center_url: None,
            templates: EmailTemplateIds {
                subscription_welcome: Some("d-welcome".to_string()),
                ..Default::default()
            },
            timeout_ms: 1_000,
        }
    }

    fn sender() -> SendGridEmailSender {
        SendGridEmailSender::new(&config(), "https://coffee.club/help".to_string()).unwrap()
    }

    #[test]
    fn send_url_strips_trailing_slash() {
        assert_eq!(sender().send_url, "https://api.sendgrid.test/v3/mail/send");
    }

    #[test]
    fn template_data_carries_common_fields() {
        let data = sender().template_data(
            EmailTemplate::SubscriptionWelcome,
            json!({ "customer_name": "Ada" }),
        );

        assert_eq!(data["subject"], "Welcome to Your Subscription!");
        assert_eq!(data["support_email"], "help@coffee.club");
        assert_eq!(data["company_name"], "Coffee Club");
        assert_eq!(data["help_center_url"], "https://coffee.club/help");
        assert_eq!(data["current_year"], json!(Utc::now().year()));
        assert_eq!(data["customer_name"], "Ada");
    }

    #[test]
    fn caller_data_overrides_common_fields() {
        let data = sender().template_data(
            EmailTemplate::SubscriptionWelcome,
            json!({ "support_email": "vip@coffee.club" }),
        );
        assert_eq!(data["support_email"], "vip@coffee.club");
    }

    #[test]
    fn message_addresses_recipient_with_template_id() {
        let message = sender().message(
            "ada@example.com",
            "d-welcome",
            EmailTemplate::SubscriptionWelcome,
            json!({}),
        );
        assert_eq!(message["template_id"], "d-welcome");
        assert_eq!(message["personalizations"][0]["to"][0]["email"], "ada@example.com");
        assert_eq!(message["from"]["name"], "Coffee Club");
    }

    #[tokio::test]
    async fn unmapped_template_fails_before_sending() {
        let err = sender()
            .send_email("ada@example.com", EmailTemplate::OrderConfirmation, json!({}))
            .await
            .unwrap_err();

        match err {
            OutboundError::TemplateNotFound(TemplateNotFound(key)) => {
                assert_eq!(key, "order_confirmation")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
