//! Error body shared by every endpoint.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::domain::webhook::OutboundError;

/// Standard error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error_code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Status and code for a failed outbound call made on behalf of an API request.
pub(crate) fn outbound_status(err: &OutboundError) -> (StatusCode, &'static str) {
    match err {
        OutboundError::UserErrors { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "COMMERCE_USER_ERRORS"),
        OutboundError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
        OutboundError::Transport { .. } | OutboundError::Rejected { .. } => {
            (StatusCode::BAD_GATEWAY, "UPSTREAM_UNAVAILABLE")
        }
        OutboundError::TemplateNotFound(_) => (StatusCode::INTERNAL_SERVER_ERROR, "TEMPLATE_NOT_FOUND"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::webhook::UserError;

    #[test]
    fn error_response_omits_missing_details() {
        let body = serde_json::to_value(ErrorResponse::new("MISSING_TOPIC", "Missing webhook topic")).unwrap();
        assert_eq!(body["error_code"], "MISSING_TOPIC");
        assert!(body.get("details").is_none());
    }

    #[test]
    fn user_errors_map_to_unprocessable() {
        let err = OutboundError::UserErrors {
            operation: "subscriptionCancel",
            errors: vec![UserError {
                field: None,
                message: "already cancelled".into(),
            }],
        };
        assert_eq!(outbound_status(&err).0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn timeouts_map_to_gateway_timeout() {
        let err = OutboundError::Timeout {
            service: "commerce",
            timeout_ms: 10,
        };
        assert_eq!(outbound_status(&err), (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"));
    }

    #[test]
    fn transport_failures_map_to_bad_gateway() {
        let err = OutboundError::transport("commerce", "connection reset");
        assert_eq!(outbound_status(&err).0, StatusCode::BAD_GATEWAY);
    }
}
