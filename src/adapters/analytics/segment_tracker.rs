//! Segment analytics tracker.
//!
//! Posts each event to the Segment track endpoint. Events tied to a customer
//! are attributed to `userId`; everything else gets a fresh `anonymousId`.
//! Transport failures are returned to the caller, never swallowed here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::config::AnalyticsConfig;
use crate::domain::webhook::OutboundError;
use crate::ports::AnalyticsTracker;

const SERVICE: &str = "analytics";

pub struct SegmentAnalyticsTracker {
    endpoint: String,
    write_key: SecretString,
    environment: &'static str,
    http_client: reqwest::Client,
    timeout: Duration,
}

impl SegmentAnalyticsTracker {
    pub fn new(
        config: &AnalyticsConfig,
        write_key: SecretString,
        environment: &'static str,
    ) -> Result<Self, OutboundError> {
        let timeout = Duration::from_millis(config.timeout_ms);
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OutboundError::transport(SERVICE, e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            write_key,
            environment,
            http_client,
            timeout,
        })
    }

    fn track_body(&self, name: &str, properties: Value) -> Value {
        let now = Utc::now().to_rfc3339();
        let mut props = match properties {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".into(), other);
                map
            }
        };
        let user_id = props
            .get("customer_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_owned);
        props.insert("timestamp".into(), json!(now));
        props.insert("environment".into(), json!(self.environment));

        let mut body = json!({
            "event": name,
            "properties": props,
            "timestamp": now,
        });
        match user_id {
            Some(id) => body["userId"] = json!(id),
            None => body["anonymousId"] = json!(Uuid::new_v4().to_string()),
        }
        body
    }
}

#[async_trait]
impl AnalyticsTracker for SegmentAnalyticsTracker {
    async fn track_event(&self, name: &str, properties: Value) -> Result<(), OutboundError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .basic_auth(self.write_key.expose_secret(), Some(""))
            .json(&self.track_body(name, properties))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OutboundError::Timeout {
                        service: SERVICE,
                        timeout_ms: self.timeout.as_millis() as u64,
                    }
                } else {
                    OutboundError::transport(SERVICE, e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OutboundError::rejected(SERVICE, status.as_u16(), body));
        }

        tracing::debug!(event = name, "Event tracked");
        Ok(())
    }
}
