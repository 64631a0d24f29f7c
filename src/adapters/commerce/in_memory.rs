//! In-memory commerce client for testing.
//!
//! Records every call for assertions and supports error injection per
//! operation plus artificial latency for timeout tests.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. Test use only.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::subscription::{OrderSummary, SubscriptionStatus, UpcomingRenewal};
use crate::domain::webhook::OutboundError;
use crate::ports::{CommerceClient, SubscriptionSnapshot};

/// A recorded commerce call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommerceCall {
    ScheduleRetry {
        subscription_id: String,
        retry_date: DateTime<Utc>,
    },
    Pause {
        subscription_id: String,
    },
    Cancel {
        subscription_id: String,
    },
    ListOrders {
        subscription_id: String,
    },
    UpcomingRenewals {
        within_days: u32,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<CommerceCall>,
    orders: HashMap<String, Vec<OrderSummary>>,
    renewals: Vec<UpcomingRenewal>,
    failures: HashMap<&'static str, OutboundError>,
    latency: Option<Duration>,
}

/// In-memory `CommerceClient`.
#[derive(Default)]
pub struct InMemoryCommerceClient {
    state: Mutex<State>,
}

impl InMemoryCommerceClient {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Setup ===

    pub fn with_orders(self, subscription_id: &str, orders: Vec<OrderSummary>) -> Self {
        self.lock().orders.insert(subscription_id.to_string(), orders);
        self
    }

    pub fn with_renewals(self, renewals: Vec<UpcomingRenewal>) -> Self {
        self.lock().renewals = renewals;
        self
    }

    /// Fail every call to `operation` ("schedule_retry", "pause", "cancel",
    /// "orders", "renewals") with `error`.
    pub fn fail_on(self, operation: &'static str, error: OutboundError) -> Self {
        self.lock().failures.insert(operation, error);
        self
    }

    /// Delay every call by `latency` before answering.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.lock().latency = Some(latency);
        self
    }

    // === Test Helpers ===

    pub fn calls(&self) -> Vec<CommerceCall> {
        self.lock().calls.clone()
    }

    pub fn retry_calls(&self) -> Vec<(String, DateTime<Utc>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CommerceCall::ScheduleRetry {
                    subscription_id,
                    retry_date,
                } => Some((subscription_id, retry_date)),
                _ => None,
            })
            .collect()
    }

    pub fn pause_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CommerceCall::Pause { subscription_id } => Some(subscription_id),
                _ => None,
            })
            .collect()
    }

    pub fn cancel_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CommerceCall::Cancel { subscription_id } => Some(subscription_id),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("InMemoryCommerceClient: state lock poisoned")
    }

    /// Records the call, waits out any latency, then returns the injected failure if any.
    async fn record(
        &self,
        operation: &'static str,
        call: CommerceCall,
    ) -> Result<(), OutboundError> {
        let (latency, failure) = {
            let mut state = self.lock();
            state.calls.push(call);
            (state.latency, state.failures.get(operation).cloned())
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn snapshot(
    subscription_id: &str,
    status: SubscriptionStatus,
    next_billing_date: Option<DateTime<Utc>>,
) -> SubscriptionSnapshot {
    SubscriptionSnapshot {
        id: subscription_id.to_string(),
        status: Some(status),
        next_billing_date,
    }
}

#[async_trait]
impl CommerceClient for InMemoryCommerceClient {
    async fn schedule_payment_retry(
        &self,
        subscription_id: &str,
        retry_date: DateTime<Utc>,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.record(
            "schedule_retry",
            CommerceCall::ScheduleRetry {
                subscription_id: subscription_id.to_string(),
                retry_date,
            },
        )
        .await?;
        Ok(snapshot(subscription_id, SubscriptionStatus::Active, Some(retry_date)))
    }

    async fn pause_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.record(
            "pause",
            CommerceCall::Pause {
                subscription_id: subscription_id.to_string(),
            },
        )
        .await?;
        Ok(snapshot(subscription_id, SubscriptionStatus::Paused, None))
    }

    async fn cancel_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<SubscriptionSnapshot, OutboundError> {
        self.record(
            "cancel",
            CommerceCall::Cancel {
                subscription_id: subscription_id.to_string(),
            },
        )
        .await?;
        Ok(snapshot(subscription_id, SubscriptionStatus::Cancelled, None))
    }

    async fn subscription_orders(
        &self,
        subscription_id: &str,
    ) -> Result<Vec<OrderSummary>, OutboundError> {
        self.record(
            "orders",
            CommerceCall::ListOrders {
                subscription_id: subscription_id.to_string(),
            },
        )
        .await?;
        Ok(self
            .lock()
            .orders
            .get(subscription_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn upcoming_renewals(
        &self,
        within_days: u32,
    ) -> Result<Vec<UpcomingRenewal>, OutboundError> {
        self.record("renewals", CommerceCall::UpcomingRenewals { within_days })
            .await?;
        Ok(self.lock().renewals.clone())
    }
}
