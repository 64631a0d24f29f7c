//! Recording email sender for testing.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. Test use only.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::OutboundError;
use crate::ports::EmailSender;

#[derive(Debug, Clone, PartialEq)]
pub struct SentEmail {
    pub to: String,
    pub template: EmailTemplate,
    pub data: Value,
}

#[derive(Default)]
struct State {
    sent: Vec<SentEmail>,
    failures: HashMap<EmailTemplate, OutboundError>,
    fail_recipients: HashMap<String, OutboundError>,
}

/// `EmailSender` that keeps every message in memory.
#[derive(Default)]
pub struct RecordingEmailSender {
    state: Mutex<State>,
}

impl RecordingEmailSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_template(self, template: EmailTemplate, error: OutboundError) -> Self {
        self.lock().failures.insert(template, error);
        self
    }

    pub fn fail_recipient(self, to: &str, error: OutboundError) -> Self {
        self.lock().fail_recipients.insert(to.to_string(), error);
        self
    }

    // === Test Helpers ===

    pub fn sent(&self) -> Vec<SentEmail> {
        self.lock().sent.clone()
    }

    pub fn sent_with(&self, template: EmailTemplate) -> Vec<SentEmail> {
        self.sent()
            .into_iter()
            .filter(|email| email.template == template)
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("RecordingEmailSender: state lock poisoned")
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(
        &self,
        to: &str,
        template: EmailTemplate,
        data: Value,
    ) -> Result<(), OutboundError> {
        let mut state = self.lock();
        if let Some(err) = state.failures.get(&template) {
            return Err(err.clone());
        }
        if let Some(err) = state.fail_recipients.get(to) {
            return Err(err.clone());
        }
        state.sent.push(SentEmail {
            to: to.to_string(),
            template,
            data,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn send_by_unknown_key_fails_without_sending() {
        let sender = RecordingEmailSender::new();
        let err = sender
            .send_email_by_key("a@example.com", "not_a_template", json!({}))
            .await
            .unwrap_err();

        assert!(matches!(err, OutboundError::TemplateNotFound(_)));
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn send_by_known_key_records_template() {
        let sender = RecordingEmailSender::new();
        sender
            .send_email_by_key("a@example.com", "order_confirmation", json!({"x": 1}))
            .await
            .unwrap();

        let sent = sender.sent_with(EmailTemplate::OrderConfirmation);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data["x"], 1);
    }
}
