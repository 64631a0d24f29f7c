//! Analytics tracker that only writes events to the log.
//!
//! Used when the analytics sink is disabled or has no write key.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::webhook::OutboundError;
use crate::ports::AnalyticsTracker;

#[derive(Debug, Clone)]
pub struct LoggingAnalyticsTracker {
    reason: &'static str,
}

impl LoggingAnalyticsTracker {
    pub fn new(reason: &'static str) -> Self {
        tracing::info!(reason, "Analytics sink disabled, events will be logged only");
        Self { reason }
    }
}

#[async_trait]
impl AnalyticsTracker for LoggingAnalyticsTracker {
    async fn track_event(&self, name: &str, properties: Value) -> Result<(), OutboundError> {
        tracing::debug!(
            event = name,
            properties = %properties,
            analytics_status = self.reason,
            "Event tracked"
        );
        Ok(())
    }
}
