//! Webhook delivery ledger adapters.

mod in_memory;

pub use in_memory::InMemoryDeliveryLedger;
