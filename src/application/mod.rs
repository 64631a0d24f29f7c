//! Application layer - Commands, Handlers and shared services.
//!
//! This layer orchestrates domain decisions and coordinates between ports.
//! Nothing here talks to the network directly; every outbound call goes
//! through a port and a time budget.

pub mod handlers;
pub mod services;

pub use handlers::{
    CancelSubscriptionCommand, CancelSubscriptionError, CancelSubscriptionHandler,
    DispatchOutcome, LifecycleHandler, ProcessWebhookCommand, ProcessWebhookHandler,
    SendRenewalRemindersCommand, SendRenewalRemindersHandler, SendRenewalRemindersResult,
    WebhookDispatcher, WebhookOutcome,
};
pub use services::{Capabilities, LifecycleServices, OutboundTimeouts, ServiceSettings};
