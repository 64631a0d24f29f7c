//! Services shared by the lifecycle handlers.
//!
//! Each service wraps one or more ports with a time budget and the metric
//! names it owns. `LifecycleServices` is built once at startup and shared
//! by every handler.

mod fulfillment_monitor;
mod health_monitor;
mod lifecycle_metrics;
mod notifier;
mod order_history;
mod outbound;
mod retry_scheduler;

use std::sync::Arc;

pub use fulfillment_monitor::{FulfillmentMonitor, ORDER_FULFILLMENT_CHECK};
pub use health_monitor::{HealthMonitor, SUBSCRIPTION_ALERT, SUBSCRIPTION_HEALTH_CHECK};
pub use lifecycle_metrics::{
    LifecycleMetrics, PaymentAttempt, RetentionSnapshot, SUBSCRIPTION_LIFECYCLE,
    SUBSCRIPTION_ORDER_TRACKED, SUBSCRIPTION_PAYMENT_METRICS, SUBSCRIPTION_RETENTION_METRICS,
};
pub use notifier::{AccountLinks, Notifier};
pub use order_history::OrderHistory;
pub use outbound::{bounded, OutboundTimeouts};
pub use retry_scheduler::{RetryOutcome, RetryScheduler};

use crate::domain::health::{HealthEvaluator, HealthThresholds};
use crate::ports::{AnalyticsTracker, CommerceClient, EmailSender, HealthSignalSource};

/// The outbound capabilities a processor is built from.
#[derive(Clone)]
pub struct Capabilities {
    pub commerce: Arc<dyn CommerceClient>,
    pub email: Arc<dyn EmailSender>,
    pub analytics: Arc<dyn AnalyticsTracker>,
    pub health_signals: Arc<dyn HealthSignalSource>,
}

/// Settings that shape the shared services.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub public_url: String,
    pub thresholds: HealthThresholds,
    pub timeouts: OutboundTimeouts,
}

#[derive(Clone)]
pub struct LifecycleServices {
    pub metrics: LifecycleMetrics,
    pub health: HealthMonitor,
    pub fulfillment: FulfillmentMonitor,
    pub scheduler: RetryScheduler,
    pub notifier: Notifier,
    pub order_history: OrderHistory,
}

impl LifecycleServices {
    pub fn new(capabilities: &Capabilities, settings: &ServiceSettings) -> Self {
        let timeouts = settings.timeouts;
        let metrics = LifecycleMetrics::new(capabilities.analytics.clone(), timeouts.analytics);
        let health = HealthMonitor::new(
            capabilities.health_signals.clone(),
            metrics.clone(),
            HealthEvaluator::new(settings.thresholds),
            timeouts.health_signals,
        );

        Self {
            fulfillment: FulfillmentMonitor::new(metrics.clone(), health.clone()),
            scheduler: RetryScheduler::new(capabilities.commerce.clone(), timeouts.commerce),
            notifier: Notifier::new(
                capabilities.email.clone(),
                AccountLinks::new(&settings.public_url),
                timeouts.email,
            ),
            order_history: OrderHistory::new(capabilities.commerce.clone(), timeouts.commerce),
            metrics,
            health,
        }
    }
}
