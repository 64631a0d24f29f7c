//! Webhook intake: dispatch table and processing pipeline.

mod dispatcher;
mod process_webhook;

pub use dispatcher::{DispatchOutcome, WebhookDispatcher};
pub use process_webhook::{
    ProcessWebhookCommand, ProcessWebhookHandler, WebhookOutcome, WEBHOOK_ERROR,
    WEBHOOK_PROCESSED,
};
