//! Subscription Relay - Webhook-driven subscription lifecycle processing
//!
//! This crate receives signed lifecycle webhooks from a commerce platform,
//! schedules payment retries or pauses, evaluates subscription health and
//! sends customer notifications and analytics events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
