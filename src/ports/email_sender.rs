//! EmailSender port - Templated transactional email.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::subscription::EmailTemplate;
use crate::domain::webhook::OutboundError;

/// Port for sending templated notification emails.
///
/// `data` is a JSON object merged into the template. Implementations add
/// their own common fields (support address, company name) on top.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_email(
        &self,
        to: &str,
        template: EmailTemplate,
        data: Value,
    ) -> Result<(), OutboundError>;

    /// Send by template key.
    ///
    /// # Errors
    ///
    /// `OutboundError::TemplateNotFound` when `template_key` is not a known template.
    async fn send_email_by_key(
        &self,
        to: &str,
        template_key: &str,
        data: Value,
    ) -> Result<(), OutboundError> {
        let template = EmailTemplate::from_key(template_key)?;
        self.send_email(to, template, data).await
    }
}
