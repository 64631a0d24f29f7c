//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `subscription` - Commerce records, money, retry cadence, email templates
//! - `webhook` - Envelope parsing, topics, signature verification, error taxonomy
//! - `health` - Health signals, threshold evaluation and alerts

pub mod health;
pub mod subscription;
pub mod webhook;
