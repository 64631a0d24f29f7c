//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `commerce` - Commerce platform GraphQL client (and in-memory double)
//! - `email` - SendGrid dynamic-template sender (and recording double)
//! - `analytics` - Segment tracker, logging fallback (and recording double)
//! - `health` - Static health signal source
//! - `ledger` - Webhook delivery ledger
//! - `http` - Axum routes for the webhook and subscription endpoints

pub mod analytics;
pub mod commerce;
pub mod email;
pub mod health;
pub mod http;
pub mod ledger;

pub use analytics::{LoggingAnalyticsTracker, RecordingAnalyticsTracker, SegmentAnalyticsTracker};
pub use commerce::{GraphqlCommerceClient, InMemoryCommerceClient};
pub use email::{RecordingEmailSender, SendGridEmailSender};
pub use health::StaticHealthSignals;
pub use ledger::InMemoryDeliveryLedger;
