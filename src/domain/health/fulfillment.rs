//! Per-order fulfillment check for subscription orders.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use super::alert::{Alert, AlertKind, AlertSeverity};
use crate::domain::subscription::Order;

/// Fulfillment snapshot for one order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FulfillmentCheck {
    pub order_id: String,
    pub subscription_id: String,
    pub shipping_status: Option<String>,
    pub delivery_estimate: Option<DateTime<Utc>>,
    pub tracking_info: Option<Value>,
    /// Hours between order creation and processing.
    pub processing_hours: Option<f64>,
    /// Days delivered (or still undelivered) past the estimate; negative when early.
    pub delay_days: Option<i64>,
    pub delayed: bool,
}

impl FulfillmentCheck {
    pub fn from_order(
        order: &Order,
        subscription_id: &str,
        delivery_delay_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        let processing_hours = match (order.created_at, order.processed_at) {
            (Some(created), Some(processed)) => {
                Some((processed - created).num_minutes() as f64 / 60.0)
            }
            _ => None,
        };

        let delay_days = order.estimated_delivery_at.map(|estimate| {
            let reference = order.delivered_at.unwrap_or(now);
            (reference - estimate).num_days()
        });

        Self {
            order_id: order.id.clone(),
            subscription_id: subscription_id.to_string(),
            shipping_status: order.fulfillment_status.clone(),
            delivery_estimate: order.estimated_delivery_at,
            tracking_info: order.tracking_info.clone(),
            processing_hours,
            delay_days,
            delayed: delay_days.is_some_and(|days| days > delivery_delay_days),
        }
    }

    pub fn alert(&self) -> Option<Alert> {
        if !self.delayed {
            return None;
        }
        Some(Alert {
            kind: AlertKind::FulfillmentDelay,
            severity: AlertSeverity::Medium,
            message: format!(
                "Order {} is {} days past its delivery estimate",
                self.order_id,
                self.delay_days.unwrap_or_default()
            ),
            subscription_id: self.subscription_id.clone(),
            metrics: json!({
                "order_id": self.order_id,
                "delay_days": self.delay_days,
                "shipping_status": self.shipping_status,
            }),
        })
    }
}
