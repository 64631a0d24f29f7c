//! Lifecycle handlers, one per supported webhook topic.

mod handler;
mod payment_failure;
mod payment_success;
mod subscription_cancelled;
mod subscription_created;
mod subscription_order;
mod subscription_updated;

#[cfg(test)]
pub(crate) mod testing;

pub use handler::LifecycleHandler;
pub use payment_failure::{PaymentFailureHandler, SUBSCRIPTION_PAYMENT_FAILED};
pub use payment_success::{PaymentSuccessHandler, SUBSCRIPTION_PAYMENT_SUCCESS};
pub use subscription_cancelled::{SubscriptionCancelledHandler, SUBSCRIPTION_CANCELLED};
pub use subscription_created::{SubscriptionCreatedHandler, SUBSCRIPTION_CREATED};
pub use subscription_order::{SubscriptionOrderHandler, SUBSCRIPTION_ORDER_CREATED};
pub use subscription_updated::{SubscriptionUpdatedHandler, SUBSCRIPTION_UPDATED};
