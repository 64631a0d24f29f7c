//! Shared fixtures for lifecycle handler tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::adapters::analytics::RecordingAnalyticsTracker;
use crate::adapters::commerce::InMemoryCommerceClient;
use crate::adapters::email::RecordingEmailSender;
use crate::adapters::health::StaticHealthSignals;
use crate::application::services::{
    Capabilities, LifecycleServices, OutboundTimeouts, ServiceSettings,
};
use crate::domain::health::{HealthSignals, HealthThresholds};
use crate::domain::webhook::WebhookEnvelope;

pub const PUBLIC_URL: &str = "https://coffee.club";

pub struct Harness {
    pub commerce: Arc<InMemoryCommerceClient>,
    pub email: Arc<RecordingEmailSender>,
    pub analytics: Arc<RecordingAnalyticsTracker>,
    pub services: Arc<LifecycleServices>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(
            InMemoryCommerceClient::new(),
            RecordingEmailSender::new(),
            RecordingAnalyticsTracker::new(),
            StaticHealthSignals::new(HealthSignals::default()),
        )
    }

    pub fn build(
        commerce: InMemoryCommerceClient,
        email: RecordingEmailSender,
        analytics: RecordingAnalyticsTracker,
        signals: StaticHealthSignals,
    ) -> Self {
        let commerce = Arc::new(commerce);
        let email = Arc::new(email);
        let analytics = Arc::new(analytics);
        let capabilities = Capabilities {
            commerce: commerce.clone(),
            email: email.clone(),
            analytics: analytics.clone(),
            health_signals: Arc::new(signals),
        };
        let settings = ServiceSettings {
            public_url: PUBLIC_URL.to_string(),
            thresholds: HealthThresholds::default(),
            timeouts: OutboundTimeouts {
                commerce: Duration::from_millis(500),
                email: Duration::from_millis(500),
                analytics: Duration::from_millis(500),
                health_signals: Duration::from_millis(500),
            },
        };

        Self {
            commerce,
            email,
            analytics,
            services: Arc::new(LifecycleServices::new(&capabilities, &settings)),
        }
    }

    /// Every outbound call recorded, across all three capabilities.
    pub fn outbound_calls(&self) -> usize {
        self.commerce.calls().len() + self.email.sent().len() + self.analytics.events().len()
    }
}

pub fn customer() -> Value {
    json!({ "id": "cust_1", "email": "ada@example.com", "first_name": "Ada" })
}

pub fn subscription(id: &str) -> Value {
    json!({
        "id": id,
        "customer": { "id": "cust_1" },
        "status": "active",
        "selling_plan": {
            "name": "Monthly Roast",
            "deliveryPolicy": { "interval": "MONTH", "intervalCount": 1 }
        },
        "line_items": [{ "title": "House Blend", "quantity": 1 }],
        "price": "24.00",
        "currency": "USD",
        "created_at": "2024-01-15T10:00:00Z",
        "next_billing_date": "2024-07-15T10:00:00Z"
    })
}

pub fn envelope(topic: &str, payload: Value) -> WebhookEnvelope {
    WebhookEnvelope {
        topic: topic.to_string(),
        id: "evt_1".to_string(),
        payload,
    }
}
