//! HTTP adapters - REST API implementations.
//!
//! Each area has its own HTTP adapter for endpoint exposure. `app_router`
//! assembles them behind the shared tracing, request-id and timeout layers.

mod error;
pub mod health;
pub mod subscriptions;
pub mod webhook;

use std::time::{Duration, Instant};

use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use error::ErrorResponse;
pub use health::{health_routes, HealthResponse};
pub use subscriptions::{subscription_routes, SubscriptionHandlers};
pub use webhook::{webhook_routes, WebhookHandlers};

/// Build the complete application router.
///
/// # Routes
///
/// - `GET /health`
/// - `POST /api/webhooks/subscription`
/// - `POST /api/subscriptions/renewal-reminders`
/// - `POST /api/subscriptions/:id/cancel`
pub fn app_router(
    webhook: WebhookHandlers,
    subscriptions: SubscriptionHandlers,
    request_timeout: Duration,
) -> Router {
    Router::new()
        .merge(health_routes(Instant::now()))
        .nest("/api/webhooks", webhook_routes(webhook))
        .nest("/api/subscriptions", subscription_routes(subscriptions))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
