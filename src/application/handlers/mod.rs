//! Application handlers.
//!
//! - `webhook` - inbound webhook pipeline and topic dispatch
//! - `lifecycle` - one handler per subscription lifecycle topic
//! - `subscription` - renewal reminders and customer-initiated cancellation

pub mod lifecycle;
pub mod subscription;
pub mod webhook;

pub use lifecycle::{
    LifecycleHandler, PaymentFailureHandler, PaymentSuccessHandler, SubscriptionCancelledHandler,
    SubscriptionCreatedHandler, SubscriptionOrderHandler, SubscriptionUpdatedHandler,
};
pub use subscription::{
    CancelSubscriptionCommand, CancelSubscriptionError, CancelSubscriptionHandler, ReminderSent,
    SendRenewalRemindersCommand, SendRenewalRemindersHandler, SendRenewalRemindersResult,
};
pub use webhook::{
    DispatchOutcome, ProcessWebhookCommand, ProcessWebhookHandler, WebhookDispatcher,
    WebhookOutcome,
};
