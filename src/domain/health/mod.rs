//! Health domain - signals, threshold evaluation, weighted scoring and alerts.

mod alert;
mod evaluator;
mod fulfillment;
mod signals;

pub use alert::{Alert, AlertKind, AlertSeverity};
pub use evaluator::{
    overall_score, CheckStatus, HealthCategory, HealthCheck, HealthEvaluator, HealthMetrics,
    HealthThresholds,
};
pub use fulfillment::FulfillmentCheck;
pub use signals::{
    FulfillmentSignals, HealthSignals, PaymentSignals, RetentionSignals, SupportSignals,
};
