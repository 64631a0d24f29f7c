//! Liveness endpoint.

use std::time::Instant;

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_secs: u64,
}

/// GET /health - Process liveness
///
/// Does not probe the commerce platform or email provider.
pub async fn health_check(State(started_at): State<Instant>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        uptime_secs: started_at.elapsed().as_secs(),
    })
}

pub fn health_routes(started_at: Instant) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(started_at)
}
