//! Webhook envelope parsing.
//!
//! The envelope is decoded from the verified raw body in two stages: first
//! into an untyped JSON object with a mandatory topic, then, once a handler
//! has been chosen, into that topic's typed payload.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::WebhookError;

/// A parsed webhook: topic, delivery id and the remaining payload fields.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEnvelope {
    pub topic: String,
    /// Event id used for duplicate detection. Empty when the sender omits it.
    pub id: String,
    pub payload: Value,
}

impl WebhookEnvelope {
    /// Parses a raw body into an envelope.
    ///
    /// The payload is either the object under a `payload` key or, when the
    /// sender inlines fields next to `topic`, everything except `topic`/`id`.
    ///
    /// # Errors
    ///
    /// - `MalformedPayload` if the body is not a JSON object
    /// - `MissingTopic` if `topic` is absent, not a string, or blank
    pub fn parse(raw_body: &[u8]) -> Result<Self, WebhookError> {
        let value: Value = serde_json::from_slice(raw_body)?;
        let Value::Object(mut fields) = value else {
            return Err(WebhookError::malformed("webhook body must be a JSON object"));
        };

        let topic = match fields.remove("topic") {
            Some(Value::String(topic)) if !topic.trim().is_empty() => topic,
            _ => return Err(WebhookError::MissingTopic),
        };

        let id = match fields.remove("id") {
            Some(Value::String(id)) => id,
            Some(Value::Number(id)) => id.to_string(),
            _ => String::new(),
        };

        let payload = match fields.remove("payload") {
            Some(Value::Object(nested)) => Value::Object(nested),
            Some(other) => {
                fields.insert("payload".to_string(), other);
                Value::Object(fields)
            }
            None => Value::Object(fields),
        };

        Ok(Self { topic, id, payload })
    }

    /// Decodes the payload into a topic-specific type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, WebhookError> {
        T::deserialize(&self.payload).map_err(|err| {
            WebhookError::malformed(format!("{} payload: {}", self.topic, err))
        })
    }

    /// Reads a top-level payload field without decoding the whole payload.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.payload.as_object().and_then(|fields| fields.get(name))
    }

    pub fn has_delivery_id(&self) -> bool {
        !self.id.is_empty()
    }
}
