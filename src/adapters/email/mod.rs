//! Email adapters.

mod in_memory;
mod sendgrid_sender;

pub use in_memory::{RecordingEmailSender, SentEmail};
pub use sendgrid_sender::SendGridEmailSender;
