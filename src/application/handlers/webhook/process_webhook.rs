//! ProcessWebhookHandler - the inbound webhook pipeline.
//!
//! verify signature -> parse envelope -> claim delivery -> dispatch -> telemetry
//!
//! Verification and parsing failures stop the pipeline before anything else
//! happens. A failed dispatch releases the delivery claim so the event
//! source's redelivery is processed again.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::dispatcher::{DispatchOutcome, WebhookDispatcher};
use crate::application::services::LifecycleMetrics;
use crate::domain::webhook::{SignatureVerifier, WebhookEnvelope, WebhookError};
use crate::ports::{ClaimResult, WebhookDeliveryLedger};

pub const WEBHOOK_PROCESSED: &str = "webhook_processed";
pub const WEBHOOK_ERROR: &str = "webhook_error";

/// A raw inbound delivery.
#[derive(Debug, Clone, Copy)]
pub struct ProcessWebhookCommand<'a> {
    /// The exact request body, as received.
    pub raw_body: &'a [u8],
    /// Value of the signature header, if present.
    pub signature: Option<&'a str>,
}

/// Result of an acknowledged delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// A lifecycle handler ran.
    Processed { topic: String },
    /// Unsupported topic, or a supported topic whose payload does not apply.
    Ignored { topic: String },
    /// The delivery id was already processed.
    Duplicate {
        event_id: String,
        processed_at: DateTime<Utc>,
    },
}

pub struct ProcessWebhookHandler {
    verifier: SignatureVerifier,
    dispatcher: Arc<WebhookDispatcher>,
    ledger: Option<Arc<dyn WebhookDeliveryLedger>>,
    metrics: LifecycleMetrics,
}

impl ProcessWebhookHandler {
    pub fn new(
        verifier: SignatureVerifier,
        dispatcher: Arc<WebhookDispatcher>,
        metrics: LifecycleMetrics,
    ) -> Self {
        Self {
            verifier,
            dispatcher,
            ledger: None,
            metrics,
        }
    }

    /// Deduplicate deliveries by event id through `ledger`.
    pub fn with_ledger(mut self, ledger: Arc<dyn WebhookDeliveryLedger>) -> Self {
        self.ledger = Some(ledger);
        self
    }

    pub async fn handle(&self, cmd: ProcessWebhookCommand<'_>) -> Result<WebhookOutcome, WebhookError> {
        // 1. Authenticate the exact bytes received
        self.verifier.verify(cmd.raw_body, cmd.signature)?;

        // 2. Parse the envelope
        let envelope = WebhookEnvelope::parse(cmd.raw_body).inspect_err(|err| {
            tracing::warn!(error = %err, body_len = cmd.raw_body.len(), "Rejected webhook body");
        })?;

        tracing::info!(topic = %envelope.topic, webhook_id = %envelope.id, "Processing webhook");

        // 3. Claim the delivery
        let mut claim = None;
        let ledger = self
            .ledger
            .as_ref()
            .filter(|_| envelope.has_delivery_id());
        if let Some(ledger) = ledger {
            match ledger.claim(&envelope.id).await? {
                ClaimResult::Claimed => {
                    claim = Some(ClaimGuard::new(ledger.clone(), &envelope.id));
                }
                ClaimResult::AlreadyProcessed { processed_at } => {
                    tracing::info!(
                        topic = %envelope.topic,
                        webhook_id = %envelope.id,
                        %processed_at,
                        "Duplicate webhook delivery acknowledged"
                    );
                    return Ok(WebhookOutcome::Duplicate {
                        event_id: envelope.id,
                        processed_at,
                    });
                }
                ClaimResult::InFlight => {
                    return Err(WebhookError::DeliveryInFlight {
                        event_id: envelope.id,
                    });
                }
            }
        }

        // 4. Dispatch
        let started = Instant::now();
        let result = self.dispatcher.dispatch(&envelope).await;
        let processing_time_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(outcome) => {
                if let Some(claim) = claim {
                    claim.complete(&envelope.topic).await;
                }

                tracing::info!(topic = %envelope.topic, processing_time_ms, "Webhook processed successfully");
                self.track_best_effort(
                    WEBHOOK_PROCESSED,
                    json!({
                        "topic": envelope.topic,
                        "processing_time_ms": processing_time_ms,
                        "success": true,
                        "handled": matches!(outcome, DispatchOutcome::Handled { .. }),
                    }),
                )
                .await;

                Ok(match outcome {
                    DispatchOutcome::Handled { .. } => WebhookOutcome::Processed {
                        topic: envelope.topic,
                    },
                    DispatchOutcome::Skipped { .. } | DispatchOutcome::Unrecognized => {
                        WebhookOutcome::Ignored {
                            topic: envelope.topic,
                        }
                    }
                })
            }
            Err(err) => {
                if let Some(claim) = claim {
                    claim.release().await;
                }

                tracing::error!(
                    topic = %envelope.topic,
                    webhook_id = %envelope.id,
                    processing_time_ms,
                    error = %err,
                    "Webhook processing failed"
                );
                self.track_best_effort(
                    WEBHOOK_ERROR,
                    json!({
                        "topic": envelope.topic,
                        "error": err.to_string(),
                        "processing_time_ms": processing_time_ms,
                    }),
                )
                .await;

                Err(err)
            }
        }
    }

    async fn track_best_effort(&self, name: &str, properties: serde_json::Value) {
        if let Err(err) = self.metrics.emit(name, properties).await {
            tracing::warn!(event = name, error = %err, "Failed to record webhook telemetry");
        }
    }
}

/// An owned delivery claim.
///
/// Resolved through `complete` or `release`. If the pipeline future is
/// dropped first, the claim is released from `Drop` on a spawned task.
struct ClaimGuard {
    ledger: Arc<dyn WebhookDeliveryLedger>,
    event_id: Option<String>,
}

impl ClaimGuard {
    fn new(ledger: Arc<dyn WebhookDeliveryLedger>, event_id: &str) -> Self {
        Self {
            ledger,
            event_id: Some(event_id.to_string()),
        }
    }

    async fn complete(mut self, topic: &str) {
        let Some(event_id) = self.event_id.clone() else {
            return;
        };
        let result = self.ledger.complete(&event_id, topic).await;
        self.event_id = None;
        if let Err(err) = result {
            tracing::error!(webhook_id = %event_id, error = %err, "Failed to record processed delivery");
        }
    }

    async fn release(mut self) {
        let Some(event_id) = self.event_id.clone() else {
            return;
        };
        let result = self.ledger.release(&event_id).await;
        self.event_id = None;
        if let Err(err) = result {
            tracing::error!(webhook_id = %event_id, error = %err, "Failed to release delivery claim");
        }
    }
}

impl Drop for ClaimGuard {
    fn drop(&mut self) {
        let Some(event_id) = self.event_id.take() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(webhook_id = %event_id, "No runtime to release abandoned delivery claim; it expires with its lease");
            return;
        };
        let ledger = self.ledger.clone();
        runtime.spawn(async move {
            match ledger.release(&event_id).await {
                Ok(()) => tracing::warn!(webhook_id = %event_id, "Released claim of abandoned delivery"),
                Err(err) => tracing::error!(webhook_id = %event_id, error = %err, "Failed to release abandoned delivery claim"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use serde_json::Value;

    use super::*;
    use crate::adapters::analytics::RecordingAnalyticsTracker;
    use crate::adapters::commerce::InMemoryCommerceClient;
    use crate::adapters::email::RecordingEmailSender;
    use crate::adapters::health::StaticHealthSignals;
    use crate::adapters::ledger::InMemoryDeliveryLedger;
    use crate::application::handlers::lifecycle::testing::{customer, subscription, Harness};
    use crate::domain::health::HealthSignals;
    use crate::domain::subscription::EmailTemplate;
    use crate::domain::webhook::{compute_signature, OutboundError};

    const SECRET: &str = "whsec_test";

    struct Fixture {
        harness: Harness,
        ledger: Arc<InMemoryDeliveryLedger>,
        handler: ProcessWebhookHandler,
    }

    fn fixture_with(harness: Harness) -> Fixture {
        let ledger = Arc::new(InMemoryDeliveryLedger::new());
        let handler = ProcessWebhookHandler::new(
            SignatureVerifier::new(Some(SecretString::new(SECRET.to_string()))),
            Arc::new(WebhookDispatcher::with_lifecycle_handlers(harness.services.clone())),
            harness.services.metrics.clone(),
        )
        .with_ledger(ledger.clone());
        Fixture {
            harness,
            ledger,
            handler,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Harness::new())
    }

    fn sign(body: &[u8]) -> String {
        compute_signature(SECRET.as_bytes(), body).unwrap()
    }

    fn body(topic: &str, id: &str, payload: Value) -> Vec<u8> {
        serde_json::to_vec(&json!({ "topic": topic, "id": id, "payload": payload })).unwrap()
    }

    fn created_body(id: &str) -> Vec<u8> {
        body(
            "subscription/created",
            id,
            json!({ "customer": customer(), "subscription": subscription("sub_1") }),
        )
    }

    async fn process(fixture: &Fixture, raw: &[u8]) -> Result<WebhookOutcome, WebhookError> {
        let signature = sign(raw);
        fixture
            .handler
            .handle(ProcessWebhookCommand {
                raw_body: raw,
                signature: Some(signature.as_str()),
            })
            .await
    }

    #[tokio::test]
    async fn bad_signature_stops_before_parsing() {
        let fixture = fixture();

        let err = fixture
            .handler
            .handle(ProcessWebhookCommand {
                raw_body: b"not json at all",
                signature: Some("bogus"),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WebhookError::InvalidSignature));
        assert_eq!(fixture.harness.outbound_calls(), 0);
    }

    #[tokio::test]
    async fn malformed_json_with_valid_signature_is_rejected() {
        let fixture = fixture();

        let err = process(&fixture, b"{\"topic\": ").await.unwrap_err();

        assert!(matches!(err, WebhookError::MalformedPayload(_)));
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert_eq!(fixture.harness.outbound_calls(), 0);
    }

    #[tokio::test]
    async fn processed_delivery_emits_telemetry() {
        let fixture = fixture();

        let outcome = process(&fixture, &created_body("evt_1")).await.unwrap();

        assert_eq!(
            outcome,
            WebhookOutcome::Processed {
                topic: "subscription/created".into()
            }
        );
        let telemetry = &fixture.harness.analytics.events_named(WEBHOOK_PROCESSED)[0];
        assert_eq!(telemetry.properties["success"], true);
        assert_eq!(telemetry.properties["topic"], "subscription/created");
        assert!(fixture.ledger.find("evt_1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_delivery_has_no_side_effects() {
        let fixture = fixture();
        process(&fixture, &created_body("evt_dup")).await.unwrap();
        let emails_after_first = fixture.harness.email.sent().len();

        let outcome = process(&fixture, &created_body("evt_dup")).await.unwrap();

        assert!(matches!(outcome, WebhookOutcome::Duplicate { ref event_id, .. } if event_id == "evt_dup"));
        assert_eq!(fixture.harness.email.sent().len(), emails_after_first);
    }

    #[tokio::test]
    async fn deliveries_without_id_bypass_ledger() {
        let fixture = fixture();

        process(&fixture, &created_body("")).await.unwrap();
        process(&fixture, &created_body("")).await.unwrap();

        assert_eq!(fixture.harness.email.sent().len(), 2);
        assert!(fixture.ledger.is_empty().await);
    }

    #[tokio::test]
    async fn failed_dispatch_releases_claim_for_redelivery() {
        let fixture = fixture_with(Harness::build(
            InMemoryCommerceClient::new(),
            RecordingEmailSender::new().fail_template(
                EmailTemplate::SubscriptionWelcome,
                OutboundError::Timeout {
                    service: "email",
                    timeout_ms: 500,
                },
            ),
            RecordingAnalyticsTracker::new(),
            StaticHealthSignals::new(HealthSignals::default()),
        ));

        let err = process(&fixture, &created_body("evt_retry")).await.unwrap_err();

        assert!(err.is_retryable());
        assert_eq!(err.status_code(), http::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(fixture.harness.analytics.has_event(WEBHOOK_ERROR));
        assert!(fixture.ledger.find("evt_retry").await.unwrap().is_none());
        assert_eq!(
            fixture.ledger.claim("evt_retry").await.unwrap(),
            ClaimResult::Claimed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_delivery_frees_its_claim() {
        let fixture = fixture_with(Harness::build(
            InMemoryCommerceClient::new().with_latency(std::time::Duration::from_secs(8)),
            RecordingEmailSender::new(),
            RecordingAnalyticsTracker::new(),
            StaticHealthSignals::new(HealthSignals::default()),
        ));
        let raw = body(
            "subscription/payment_failure",
            "evt_cut",
            json!({
                "customer": customer(),
                "subscription": subscription("sub_1"),
                "attempt_number": 1,
            }),
        );

        let cut = tokio::time::timeout(
            std::time::Duration::from_millis(100),
            process(&fixture, &raw),
        )
        .await;
        assert!(cut.is_err());

        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert!(fixture.ledger.is_empty().await);
        assert_eq!(
            fixture.ledger.claim("evt_cut").await.unwrap(),
            ClaimResult::Claimed
        );
    }

    #[tokio::test]
    async fn unrecognized_topic_is_ignored() {
        let fixture = fixture();

        let outcome = process(&fixture, &body("shop/update", "evt_9", json!({}))).await.unwrap();

        assert_eq!(outcome, WebhookOutcome::Ignored { topic: "shop/update".into() });
        assert!(fixture.harness.email.sent().is_empty());
        assert!(fixture.harness.commerce.calls().is_empty());
    }

    #[tokio::test]
    async fn telemetry_failure_does_not_fail_delivery() {
        let fixture = fixture_with(Harness::build(
            InMemoryCommerceClient::new(),
            RecordingEmailSender::new(),
            RecordingAnalyticsTracker::new()
                .fail_event(WEBHOOK_PROCESSED, OutboundError::transport("analytics", "down")),
            StaticHealthSignals::new(HealthSignals::default()),
        ));

        assert!(process(&fixture, &created_body("evt_2")).await.is_ok());
    }

    #[tokio::test]
    async fn concurrent_deliveries_for_different_subscriptions() {
        let fixture = Arc::new(fixture());
        let bodies: Vec<Vec<u8>> = (0..8)
            .map(|i| {
                body(
                    "subscription/created",
                    &format!("evt_{i}"),
                    json!({ "customer": customer(), "subscription": subscription(&format!("sub_{i}")) }),
                )
            })
            .collect();

        let results = futures::future::join_all(bodies.iter().map(|raw| {
            let fixture = fixture.clone();
            async move { process(&fixture, raw).await }
        }))
        .await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(fixture.harness.email.sent().len(), 8);
    }
}
