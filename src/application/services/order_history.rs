//! Historical orders for a subscription.

use std::sync::Arc;
use std::time::Duration;

use super::outbound::bounded;
use crate::domain::subscription::OrderSummary;
use crate::domain::webhook::OutboundError;
use crate::ports::CommerceClient;

#[derive(Clone)]
pub struct OrderHistory {
    commerce: Arc<dyn CommerceClient>,
    timeout: Duration,
}

impl OrderHistory {
    pub fn new(commerce: Arc<dyn CommerceClient>, timeout: Duration) -> Self {
        Self { commerce, timeout }
    }

    pub async fn orders(&self, subscription_id: &str) -> Result<Vec<OrderSummary>, OutboundError> {
        bounded("commerce", self.timeout, self.commerce.subscription_orders(subscription_id)).await
    }
}
