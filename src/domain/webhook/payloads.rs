//! Typed payloads, one per supported topic.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::subscription::{Customer, Order, Subscription};

/// `subscription/created`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCreatedPayload {
    pub customer: Customer,
    pub subscription: Subscription,
}

/// `subscription/updated`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionUpdatedPayload {
    pub customer: Customer,
    pub subscription: Subscription,
    /// Diff supplied by the sender, forwarded untouched.
    #[serde(default)]
    pub changes: Value,
}

/// `subscription/cancelled`
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionCancelledPayload {
    pub customer: Customer,
    pub subscription: Subscription,
    #[serde(default)]
    pub reason: Option<String>,
}

/// `subscription/payment_failure`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentFailurePayload {
    pub customer: Customer,
    pub subscription: Subscription,
    pub attempt_number: u32,
    #[serde(default)]
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// `subscription/payment_success`
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentSuccessPayload {
    pub customer: Customer,
    pub subscription: Subscription,
    #[serde(default)]
    pub order: Option<Order>,
    #[serde(default)]
    pub retry_attempt: Option<u32>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl PaymentSuccessPayload {
    /// True when this success settled a previously failed attempt.
    pub fn followed_retry(&self) -> bool {
        self.retry_attempt.is_some_and(|attempt| attempt > 0)
    }
}

/// `orders/create` for an order generated by a subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionOrderPayload {
    pub customer: Customer,
    pub order: Order,
    pub subscription: Subscription,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> Value {
        json!({
            "customer": { "id": "c1", "email": "c1@example.com" },
            "subscription": { "id": "s1" }
        })
    }

    #[test]
    fn payment_success_without_retry_attempt() {
        let payload: PaymentSuccessPayload = serde_json::from_value(base()).unwrap();
        assert!(!payload.followed_retry());
    }

    #[test]
    fn payment_success_after_retry() {
        let mut body = base();
        body["retry_attempt"] = json!(2);
        let payload: PaymentSuccessPayload = serde_json::from_value(body).unwrap();
        assert!(payload.followed_retry());
    }

    #[test]
    fn retry_attempt_zero_is_first_attempt() {
        let mut body = base();
        body["retry_attempt"] = json!(0);
        let payload: PaymentSuccessPayload = serde_json::from_value(body).unwrap();
        assert!(!payload.followed_retry());
    }

    #[test]
    fn payment_failure_requires_attempt_number() {
        assert!(serde_json::from_value::<PaymentFailurePayload>(base()).is_err());
    }

    #[test]
    fn updated_changes_default_to_null() {
        let payload: SubscriptionUpdatedPayload = serde_json::from_value(base()).unwrap();
        assert!(payload.changes.is_null());
    }
}
