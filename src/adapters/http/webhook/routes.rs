//! HTTP routes for the webhook endpoint.

use axum::{routing::post, Router};

use super::handlers::{receive_subscription_webhook, WebhookHandlers};

/// Creates the webhook router. Mounted at `/api/webhooks`.
///
/// No authentication layer: deliveries are authenticated by signature.
pub fn webhook_routes(handlers: WebhookHandlers) -> Router {
    Router::new()
        .route("/subscription", post(receive_subscription_webhook))
        .with_state(handlers)
}
