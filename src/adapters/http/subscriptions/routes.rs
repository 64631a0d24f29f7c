//! HTTP routes for subscription endpoints.

use axum::{routing::post, Router};

use super::handlers::{cancel_subscription, send_renewal_reminders, SubscriptionHandlers};

/// Creates the subscription router. Mounted at `/api/subscriptions`.
pub fn subscription_routes(handlers: SubscriptionHandlers) -> Router {
    Router::new()
        .route("/renewal-reminders", post(send_renewal_reminders))
        .route("/:id/cancel", post(cancel_subscription))
        .with_state(handlers)
}
