//! HTTP handler for the subscription webhook endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ErrorResponse;
use crate::application::handlers::webhook::{ProcessWebhookCommand, ProcessWebhookHandler};
use crate::domain::webhook::WebhookError;

use super::dto::WebhookAckResponse;

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct WebhookHandlers {
    process_handler: Arc<ProcessWebhookHandler>,
    signature_header: HeaderName,
}

impl WebhookHandlers {
    pub fn new(process_handler: Arc<ProcessWebhookHandler>, signature_header: HeaderName) -> Self {
        Self {
            process_handler,
            signature_header,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/subscription - Process a signed lifecycle event
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent.
pub async fn receive_subscription_webhook(
    State(handlers): State<WebhookHandlers>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, WebhookApiError> {
    let signature = headers
        .get(&handlers.signature_header)
        .and_then(|v| v.to_str().ok());

    tracing::debug!(
        signature = if signature.is_some() { "present" } else { "missing" },
        content_length = body.len(),
        "Received webhook"
    );

    let cmd = ProcessWebhookCommand {
        raw_body: &body,
        signature,
    };

    let outcome = handlers.process_handler.handle(cmd).await?;
    Ok((StatusCode::OK, Json(WebhookAckResponse::from(&outcome))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, code = self.0.error_code(), "Webhook handler error");
        }
        let body = ErrorResponse::new(self.0.error_code(), self.0.to_string());
        (status, Json(body)).into_response()
    }
}
