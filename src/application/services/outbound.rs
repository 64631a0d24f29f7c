//! Time budgets for outbound calls.

use std::future::Future;
use std::time::Duration;

use crate::domain::webhook::OutboundError;

/// Per-capability time budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundTimeouts {
    pub commerce: Duration,
    pub email: Duration,
    pub analytics: Duration,
    pub health_signals: Duration,
}

impl Default for OutboundTimeouts {
    fn default() -> Self {
        Self {
            commerce: Duration::from_secs(10),
            email: Duration::from_secs(10),
            analytics: Duration::from_secs(5),
            health_signals: Duration::from_secs(5),
        }
    }
}

/// Run `call`, failing with `OutboundError::Timeout` once `timeout` elapses.
pub async fn bounded<T, F>(service: &'static str, timeout: Duration, call: F) -> Result<T, OutboundError>
where
    F: Future<Output = Result<T, OutboundError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(service, timeout_ms = timeout.as_millis() as u64, "Outbound call timed out");
            Err(OutboundError::Timeout {
                service,
                timeout_ms: timeout.as_millis() as u64,
            })
        }
    }
}
