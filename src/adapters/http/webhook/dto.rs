//! Response bodies for the webhook endpoint.

use serde::{Deserialize, Serialize};

use crate::application::handlers::webhook::WebhookOutcome;

/// Body returned for every acknowledged delivery.
///
/// The event source only looks at the status code; the body is for humans
/// reading delivery logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookAckResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

impl From<&WebhookOutcome> for WebhookAckResponse {
    fn from(outcome: &WebhookOutcome) -> Self {
        Self {
            success: true,
            duplicate: matches!(outcome, WebhookOutcome::Duplicate { .. }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn processed_delivery_serializes_success_only() {
        let outcome = WebhookOutcome::Processed {
            topic: "subscription/created".into(),
        };
        let body = serde_json::to_value(WebhookAckResponse::from(&outcome)).unwrap();
        assert_eq!(body, serde_json::json!({ "success": true }));
    }

    #[test]
    fn duplicate_delivery_is_flagged() {
        let outcome = WebhookOutcome::Duplicate {
            event_id: "evt_1".into(),
            processed_at: Utc::now(),
        };
        let body = serde_json::to_value(WebhookAckResponse::from(&outcome)).unwrap();
        assert_eq!(body["duplicate"], true);
    }
}
