//! Webhook error types.
//!
//! Defines every failure that can occur while processing a subscription
//! webhook, with HTTP status mapping and retryability semantics. The event
//! source redelivers on 5xx only, so the split between client errors and
//! handler failures decides whether a delivery is ever seen again.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::subscription::TemplateNotFound;

/// A field-level error reported by a commerce mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default)]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Failure of an outbound call to the commerce platform, email provider or analytics sink.
#[derive(Debug, Clone, Error)]
pub enum OutboundError {
    /// The call did not complete within its time budget.
    #[error("{service} call timed out after {timeout_ms}ms")]
    Timeout { service: &'static str, timeout_ms: u64 },

    /// The request never produced a usable response.
    #[error("{service} transport error: {message}")]
    Transport { service: &'static str, message: String },

    /// The remote service answered with a non-success status.
    #[error("{service} rejected the request ({status}): {message}")]
    Rejected {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A mutation completed but reported user errors.
    #[error("{operation} returned user errors: {}", join_messages(.errors))]
    UserErrors {
        operation: &'static str,
        errors: Vec<UserError>,
    },

    /// Notification requested for a template with no provider mapping.
    #[error(transparent)]
    TemplateNotFound(#[from] TemplateNotFound),
}

fn join_messages(errors: &[UserError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl OutboundError {
    pub fn transport(service: &'static str, message: impl Into<String>) -> Self {
        Self::Transport {
            service,
            message: message.into(),
        }
    }

    pub fn rejected(service: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            service,
            status,
            message: message.into(),
        }
    }
}

/// Errors that occur during webhook processing.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Signature header missing, secret unset, or HMAC mismatch.
    #[error("Invalid webhook signature")]
    InvalidSignature,

    /// Body is not valid JSON or a topic payload is missing required fields.
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Envelope has no non-empty `topic`.
    #[error("Missing webhook topic")]
    MissingTopic,

    /// The retry mutation for a failed payment was rejected or did not complete.
    #[error(
        "Retry scheduling failed for subscription {subscription_id} (attempt {attempt_number}): {source}"
    )]
    RetrySchedulingFailed {
        subscription_id: String,
        attempt_number: u32,
        #[source]
        source: OutboundError,
    },

    /// The pause mutation after the final failed payment was rejected or did not complete.
    #[error("Pause failed for subscription {subscription_id} (attempt {attempt_number}): {source}")]
    PauseFailed {
        subscription_id: String,
        attempt_number: u32,
        #[source]
        source: OutboundError,
    },

    /// Any other downstream failure inside a lifecycle handler.
    #[error("Handler failure: {0}")]
    HandlerFailure(#[from] OutboundError),

    /// Another worker is processing the same delivery id right now.
    #[error("Delivery {event_id} is already being processed")]
    DeliveryInFlight { event_id: String },

    /// The delivery ledger could not be read or written.
    #[error("Delivery ledger error: {0}")]
    Ledger(String),
}

impl WebhookError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload(message.into())
    }

    /// Returns true if the event source should redeliver this webhook.
    ///
    /// Verification and parsing failures are terminal for the delivery;
    /// everything raised after dispatch is retryable.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Self::InvalidSignature | Self::MalformedPayload(_) | Self::MissingTopic
        )
    }

    /// Returns the HTTP status code to respond with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::MalformedPayload(_) | Self::MissingTopic => StatusCode::BAD_REQUEST,
            Self::RetrySchedulingFailed { .. }
            | Self::PauseFailed { .. }
            | Self::HandlerFailure(_)
            | Self::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::DeliveryInFlight { .. } => StatusCode::CONFLICT,
        }
    }

    /// Stable machine-readable code for response bodies and telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSignature => "INVALID_SIGNATURE",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::MissingTopic => "MISSING_TOPIC",
            Self::RetrySchedulingFailed { .. } => "RETRY_SCHEDULING_FAILED",
            Self::PauseFailed { .. } => "PAUSE_FAILED",
            Self::HandlerFailure(_) => "HANDLER_FAILURE",
            Self::DeliveryInFlight { .. } => "DELIVERY_IN_FLIGHT",
            Self::Ledger(_) => "LEDGER_ERROR",
        }
    }
}

impl From<serde_json::Error> for WebhookError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeout() -> OutboundError {
        OutboundError::Timeout {
            service: "commerce",
            timeout_ms: 5000,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Status Mapping
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn invalid_signature_is_unauthorized_and_terminal() {
        let err = WebhookError::InvalidSignature;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(!err.is_retryable());
    }

    #[test]
    fn parse_errors_are_bad_request_and_terminal() {
        for err in [WebhookError::malformed("eof"), WebhookError::MissingTopic] {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn handler_failures_are_server_errors_and_retryable() {
        let errors = [
            WebhookError::HandlerFailure(timeout()),
            WebhookError::RetrySchedulingFailed {
                subscription_id: "s1".into(),
                attempt_number: 2,
                source: timeout(),
            },
            WebhookError::PauseFailed {
                subscription_id: "s1".into(),
                attempt_number: 4,
                source: timeout(),
            },
            WebhookError::Ledger("poisoned".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn in_flight_delivery_is_a_retryable_conflict() {
        let err = WebhookError::DeliveryInFlight {
            event_id: "evt_9".into(),
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert!(err.is_retryable());
    }

    // ══════════════════════════════════════════════════════════════
    // Messages
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn retry_failure_message_carries_diagnosis_context() {
        let err = WebhookError::RetrySchedulingFailed {
            subscription_id: "gid://shopify/SubscriptionContract/5".into(),
            attempt_number: 3,
            source: OutboundError::UserErrors {
                operation: "subscriptionPaymentRetry",
                errors: vec![UserError {
                    field: Some(vec!["retryDate".into()]),
                    message: "Retry date must be in the future".into(),
                }],
            },
        };
        let message = err.to_string();
        assert!(message.contains("SubscriptionContract/5"));
        assert!(message.contains("attempt 3"));
        assert!(message.contains("Retry date must be in the future"));
    }

    #[test]
    fn serde_errors_become_malformed_payload() {
        let err: WebhookError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, WebhookError::MalformedPayload(_)));
    }

    #[test]
    fn template_not_found_converts_into_handler_failure() {
        let outbound: OutboundError = TemplateNotFound("mystery".into()).into();
        let err: WebhookError = outbound.into();
        assert_eq!(err.error_code(), "HANDLER_FAILURE");
        assert!(err.to_string().contains("mystery"));
    }
}
