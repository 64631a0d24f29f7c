//! Health signals served from configuration.
//!
//! Stands in for a real analytics backend: every subscription gets the
//! configured baseline unless a per-subscription override is registered.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::domain::health::{
    FulfillmentSignals, HealthSignals, PaymentSignals, RetentionSignals, SupportSignals,
};
use crate::domain::subscription::Subscription;
use crate::domain::webhook::OutboundError;
use crate::ports::HealthSignalSource;

#[derive(Debug, Clone, Default)]
pub struct StaticHealthSignals {
    baseline: HealthSignals,
    overrides: HashMap<String, HealthSignals>,
}

impl StaticHealthSignals {
    pub fn new(baseline: HealthSignals) -> Self {
        Self {
            baseline,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, subscription_id: &str, signals: HealthSignals) -> Self {
        self.overrides.insert(subscription_id.to_string(), signals);
        self
    }

    fn signals_for(&self, subscription: &Subscription) -> &HealthSignals {
        self.overrides
            .get(&subscription.id)
            .unwrap_or(&self.baseline)
    }
}

#[async_trait]
impl HealthSignalSource for StaticHealthSignals {
    async fn payment_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<PaymentSignals, OutboundError> {
        Ok(self.signals_for(subscription).payment)
    }

    async fn fulfillment_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<FulfillmentSignals, OutboundError> {
        Ok(self.signals_for(subscription).fulfillment)
    }

    async fn retention_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<RetentionSignals, OutboundError> {
        Ok(self.signals_for(subscription).retention)
    }

    async fn support_signals(
        &self,
        subscription: &Subscription,
    ) -> Result<SupportSignals, OutboundError> {
        Ok(self.signals_for(subscription).support)
    }
}
