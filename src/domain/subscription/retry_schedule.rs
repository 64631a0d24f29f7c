//! Payment retry cadence.
//!
//! Failed renewals are retried on a fixed schedule keyed by attempt number.
//! An attempt with no entry is terminal and the subscription is paused.

use chrono::{DateTime, Duration, Utc};

/// Attempt number to delay in days.
const RETRY_SCHEDULE: [(u32, u32); 3] = [(1, 1), (2, 3), (3, 7)];

/// Days to wait before retrying after the given failed attempt.
///
/// Returns `None` once the schedule is exhausted.
pub fn retry_delay_days(attempt_number: u32) -> Option<u32> {
    RETRY_SCHEDULE
        .iter()
        .find(|(attempt, _)| *attempt == attempt_number)
        .map(|(_, days)| *days)
}

/// What to do after a failed payment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt_number: u32, delay_days: u32 },
    Pause { attempt_number: u32 },
}

impl RetryDecision {
    pub fn for_attempt(attempt_number: u32) -> Self {
        match retry_delay_days(attempt_number) {
            Some(delay_days) => Self::Retry {
                attempt_number,
                delay_days,
            },
            None => Self::Pause { attempt_number },
        }
    }

    pub fn attempt_number(&self) -> u32 {
        match self {
            Self::Retry { attempt_number, .. } | Self::Pause { attempt_number } => *attempt_number,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retry { .. } => "retry_scheduled",
            Self::Pause { .. } => "paused",
        }
    }
}

/// The instant a retry should run, `days` after `now`.
pub fn retry_date(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    now + Duration::days(i64::from(days))
}
