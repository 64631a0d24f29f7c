//! HTTP adapter for the inbound subscription webhook.
//!
//! - `POST /api/webhooks/subscription` - Signed lifecycle event from the commerce platform

mod dto;
mod handlers;
mod routes;

pub use dto::WebhookAckResponse;
pub use handlers::{WebhookApiError, WebhookHandlers};
pub use routes::webhook_routes;
