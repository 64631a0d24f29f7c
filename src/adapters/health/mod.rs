//! Health signal source adapters.

mod static_signals;

pub use static_signals::StaticHealthSignals;
