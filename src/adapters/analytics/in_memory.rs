//! Recording analytics tracker for testing.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. Test use only.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::webhook::OutboundError;
use crate::ports::AnalyticsTracker;

#[derive(Debug, Clone, PartialEq)]
pub struct TrackedEvent {
    pub name: String,
    pub properties: Value,
}

#[derive(Default)]
struct State {
    events: Vec<TrackedEvent>,
    failures: HashMap<String, OutboundError>,
    flushes: usize,
}

/// `AnalyticsTracker` that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAnalyticsTracker {
    state: Mutex<State>,
}

impl RecordingAnalyticsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail tracking of events named `name`.
    pub fn fail_event(self, name: &str, error: OutboundError) -> Self {
        self.lock().failures.insert(name.to_string(), error);
        self
    }

    // === Test Helpers ===

    pub fn events(&self) -> Vec<TrackedEvent> {
        self.lock().events.clone()
    }

    pub fn events_named(&self, name: &str) -> Vec<TrackedEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.name == name)
            .collect()
    }

    pub fn has_event(&self, name: &str) -> bool {
        self.lock().events.iter().any(|event| event.name == name)
    }

    pub fn flush_count(&self) -> usize {
        self.lock().flushes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state
            .lock()
            .expect("RecordingAnalyticsTracker: state lock poisoned")
    }
}

#[async_trait]
impl AnalyticsTracker for RecordingAnalyticsTracker {
    async fn track_event(&self, name: &str, properties: Value) -> Result<(), OutboundError> {
        let mut state = self.lock();
        if let Some(err) = state.failures.get(name) {
            return Err(err.clone());
        }
        state.events.push(TrackedEvent {
            name: name.to_string(),
            properties,
        });
        Ok(())
    }

    async fn flush(&self) -> Result<(), OutboundError> {
        self.lock().flushes += 1;
        Ok(())
    }
}
