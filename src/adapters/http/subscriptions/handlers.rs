//! HTTP handlers for subscription endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{outbound_status, ErrorResponse};
use crate::application::handlers::subscription::{
    CancelSubscriptionCommand, CancelSubscriptionError, CancelSubscriptionHandler,
    SendRenewalRemindersCommand, SendRenewalRemindersHandler,
};
use crate::domain::webhook::OutboundError;

use super::dto::{
    CancelSubscriptionResponse, RenewalRemindersRequest, RenewalRemindersResponse,
    MAX_RENEWAL_WINDOW_DAYS,
};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct SubscriptionHandlers {
    reminders_handler: Arc<SendRenewalRemindersHandler>,
    cancel_handler: Arc<CancelSubscriptionHandler>,
}

impl SubscriptionHandlers {
    pub fn new(
        reminders_handler: Arc<SendRenewalRemindersHandler>,
        cancel_handler: Arc<CancelSubscriptionHandler>,
    ) -> Self {
        Self {
            reminders_handler,
            cancel_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/subscriptions/renewal-reminders - Send reminder emails for upcoming renewals
///
/// Accepts an empty body or `{"within_days": n}`.
pub async fn send_renewal_reminders(
    State(handlers): State<SubscriptionHandlers>,
    body: Bytes,
) -> Result<Response, SubscriptionApiError> {
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        RenewalRemindersRequest::default()
    } else {
        serde_json::from_slice::<RenewalRemindersRequest>(&body)
            .map_err(|e| SubscriptionApiError::InvalidRequest(e.to_string()))?
    };

    if let Some(days) = req.invalid_window() {
        return Err(SubscriptionApiError::InvalidRequest(format!(
            "within_days must be between 1 and {MAX_RENEWAL_WINDOW_DAYS}, got {days}"
        )));
    }

    let cmd = SendRenewalRemindersCommand {
        within_days: req.within_days,
    };

    let result = handlers.reminders_handler.handle(cmd).await?;
    Ok((StatusCode::OK, Json(RenewalRemindersResponse::from(result))).into_response())
}

/// POST /api/subscriptions/:id/cancel - Cancel a subscription
pub async fn cancel_subscription(
    State(handlers): State<SubscriptionHandlers>,
    Path(subscription_id): Path<String>,
) -> Result<Response, SubscriptionApiError> {
    let cmd = CancelSubscriptionCommand { subscription_id };

    let snapshot = handlers.cancel_handler.handle(cmd).await?;
    Ok((StatusCode::OK, Json(CancelSubscriptionResponse::from(snapshot))).into_response())
}

// ════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub enum SubscriptionApiError {
    InvalidRequest(String),
    Cancel(CancelSubscriptionError),
    Upstream(OutboundError),
}

impl From<CancelSubscriptionError> for SubscriptionApiError {
    fn from(err: CancelSubscriptionError) -> Self {
        Self::Cancel(err)
    }
}

impl From<OutboundError> for SubscriptionApiError {
    fn from(err: OutboundError) -> Self {
        Self::Upstream(err)
    }
}

impl IntoResponse for SubscriptionApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::InvalidRequest(message) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST", message),
            Self::Cancel(err @ CancelSubscriptionError::InvalidSubscriptionId) => {
                (StatusCode::BAD_REQUEST, "INVALID_SUBSCRIPTION_ID", err.to_string())
            }
            Self::Cancel(CancelSubscriptionError::Commerce(err)) | Self::Upstream(err) => {
                let (status, code) = outbound_status(&err);
                (status, code, err.to_string())
            }
        };

        (status, Json(ErrorResponse::new(error_code, message))).into_response()
    }
}
