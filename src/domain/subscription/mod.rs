//! Subscription domain - commerce records, money, retry cadence and notification templates.

mod email_template;
mod model;
mod money;
mod retry_schedule;

pub use email_template::{EmailTemplate, TemplateNotFound};
pub use model::{
    lifetime_value, Customer, CustomerRef, DeliveryPolicy, LineItem, Order, OrderSummary,
    SellingPlan, ShippingLine, Subscription, SubscriptionStatus, UpcomingRenewal,
};
pub use money::MinorUnits;
pub use retry_schedule::{retry_date, retry_delay_days, RetryDecision};
