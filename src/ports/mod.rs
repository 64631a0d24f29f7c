//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Outbound Capabilities
//!
//! - `CommerceClient` - Subscription mutations and order history
//! - `EmailSender` - Templated notification email
//! - `AnalyticsTracker` - Metrics, analytics events and alerts
//! - `HealthSignalSource` - Historical aggregates for health evaluation
//!
//! ## Webhook Ports
//!
//! - `WebhookDeliveryLedger` - Duplicate delivery detection

mod analytics_tracker;
mod commerce_client;
mod email_sender;
mod health_signal_source;
mod webhook_delivery_ledger;

pub use analytics_tracker::AnalyticsTracker;
pub use commerce_client::{CommerceClient, SubscriptionSnapshot};
pub use email_sender::EmailSender;
pub use health_signal_source::HealthSignalSource;
pub use webhook_delivery_ledger::{ClaimResult, DeliveryRecord, LedgerError, WebhookDeliveryLedger};

pub use crate::domain::webhook::OutboundError;
