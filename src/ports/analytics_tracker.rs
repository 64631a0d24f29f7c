//! AnalyticsTracker port - Structured analytics events, metrics and alerts.
//!
//! Callers treat tracking as fire-and-forget in terms of control flow, but
//! `track_event` must report its own failures. A production implementation
//! never swallows a transport error.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::webhook::OutboundError;

#[async_trait]
pub trait AnalyticsTracker: Send + Sync {
    /// Record one named event. `properties` is a JSON object.
    async fn track_event(&self, name: &str, properties: Value) -> Result<(), OutboundError>;

    /// Deliver anything buffered. Called once on shutdown.
    async fn flush(&self) -> Result<(), OutboundError> {
        Ok(())
    }
}
