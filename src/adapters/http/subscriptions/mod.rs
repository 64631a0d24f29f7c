//! HTTP adapter for subscription operations outside the webhook path.
//!
//! - `POST /api/subscriptions/renewal-reminders` - Email customers whose renewal is near
//! - `POST /api/subscriptions/:id/cancel` - Cancel a subscription on the commerce platform

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CancelSubscriptionResponse, RenewalReminderDetail, RenewalRemindersRequest,
    RenewalRemindersResponse,
};
pub use handlers::{SubscriptionApiError, SubscriptionHandlers};
pub use routes::subscription_routes;
