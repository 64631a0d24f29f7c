//! Webhook domain - envelope parsing, topic table, signature verification and errors.

mod envelope;
mod errors;
mod payloads;
mod topic;
mod verifier;

pub use envelope::WebhookEnvelope;
pub use errors::{OutboundError, UserError, WebhookError};
pub use payloads::{
    PaymentFailurePayload, PaymentSuccessPayload, SubscriptionCancelledPayload,
    SubscriptionCreatedPayload, SubscriptionOrderPayload, SubscriptionUpdatedPayload,
};
pub use topic::WebhookTopic;
pub use verifier::{compute_signature, verify, SignatureVerifier, DEFAULT_SIGNATURE_HEADER};
