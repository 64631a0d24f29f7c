//! Subscription commands outside the webhook path.

mod cancel_subscription;
mod send_renewal_reminders;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionError, CancelSubscriptionHandler,
};
pub use send_renewal_reminders::{
    ReminderSent, SendRenewalRemindersCommand, SendRenewalRemindersHandler,
    SendRenewalRemindersResult,
};
