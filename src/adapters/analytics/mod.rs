//! Analytics adapters.
//!
//! - `SegmentAnalyticsTracker` - production sink
//! - `LoggingAnalyticsTracker` - log-only fallback when the sink is disabled
//! - `RecordingAnalyticsTracker` - in-memory recorder for tests

mod in_memory;
mod logging_tracker;
mod segment_tracker;

pub use in_memory::{RecordingAnalyticsTracker, TrackedEvent};
pub use logging_tracker::LoggingAnalyticsTracker;
pub use segment_tracker::SegmentAnalyticsTracker;
