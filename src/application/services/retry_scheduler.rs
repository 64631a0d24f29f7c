//! Retry / pause scheduler for failed renewals.
//!
//! Applies the fixed retry cadence and issues the matching commerce
//! mutation. Exactly one mutation is issued per decision.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::outbound::bounded;
use crate::domain::subscription::{retry_date, RetryDecision};
use crate::domain::webhook::WebhookError;
use crate::ports::CommerceClient;

/// What the scheduler did for a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryOutcome {
    Scheduled {
        attempt_number: u32,
        delay_days: u32,
        retry_at: DateTime<Utc>,
    },
    Paused {
        attempt_number: u32,
    },
}

impl RetryOutcome {
    pub fn decision(&self) -> RetryDecision {
        match *self {
            Self::Scheduled {
                attempt_number,
                delay_days,
                ..
            } => RetryDecision::Retry {
                attempt_number,
                delay_days,
            },
            Self::Paused { attempt_number } => RetryDecision::Pause { attempt_number },
        }
    }

    pub fn retry_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled { retry_at, .. } => Some(*retry_at),
            Self::Paused { .. } => None,
        }
    }
}

#[derive(Clone)]
pub struct RetryScheduler {
    commerce: Arc<dyn CommerceClient>,
    timeout: Duration,
}

impl RetryScheduler {
    pub fn new(commerce: Arc<dyn CommerceClient>, timeout: Duration) -> Self {
        Self { commerce, timeout }
    }

    /// Schedule a retry or pause the subscription, depending on the attempt number.
    pub async fn handle_failed_attempt(
        &self,
        subscription_id: &str,
        attempt_number: u32,
    ) -> Result<RetryOutcome, WebhookError> {
        match RetryDecision::for_attempt(attempt_number) {
            RetryDecision::Retry {
                attempt_number,
                delay_days,
            } => {
                let retry_at = self
                    .schedule_retry(subscription_id, attempt_number, delay_days)
                    .await?;
                Ok(RetryOutcome::Scheduled {
                    attempt_number,
                    delay_days,
                    retry_at,
                })
            }
            RetryDecision::Pause { attempt_number } => {
                self.pause(subscription_id, attempt_number).await?;
                Ok(RetryOutcome::Paused { attempt_number })
            }
        }
    }

    /// Set the next billing attempt `delay_days` from now.
    pub async fn schedule_retry(
        &self,
        subscription_id: &str,
        attempt_number: u32,
        delay_days: u32,
    ) -> Result<DateTime<Utc>, WebhookError> {
        let retry_at = retry_date(Utc::now(), delay_days);
        bounded(
            "commerce",
            self.timeout,
            self.commerce.schedule_payment_retry(subscription_id, retry_at),
        )
        .await
        .map_err(|source| WebhookError::RetrySchedulingFailed {
            subscription_id: subscription_id.to_string(),
            attempt_number,
            source,
        })?;

        tracing::info!(
            subscription_id,
            attempt_number,
            delay_days,
            retry_at = %retry_at,
            "Payment retry scheduled"
        );
        Ok(retry_at)
    }

    pub async fn pause(&self, subscription_id: &str, attempt_number: u32) -> Result<(), WebhookError> {
        bounded("commerce", self.timeout, self.commerce.pause_subscription(subscription_id))
            .await
            .map_err(|source| WebhookError::PauseFailed {
                subscription_id: subscription_id.to_string(),
                attempt_number,
                source,
            })?;

        tracing::info!(subscription_id, attempt_number, "Subscription paused after final payment failure");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::commerce::InMemoryCommerceClient;
    use crate::domain::webhook::{OutboundError, UserError};
    use chrono::Duration as ChronoDuration;

    fn scheduler(client: Arc<InMemoryCommerceClient>) -> RetryScheduler {
        RetryScheduler::new(client, Duration::from_millis(200))
    }

    #[tokio::test]
    async fn attempts_one_to_three_schedule_retries() {
        for (attempt, days) in [(1, 1), (2, 3), (3, 7)] {
            let client = Arc::new(InMemoryCommerceClient::new());
            let before = Utc::now();

            let outcome = scheduler(client.clone())
                .handle_failed_attempt("s1", attempt)
                .await
                .unwrap();

            assert!(matches!(outcome, RetryOutcome::Scheduled { delay_days, .. } if delay_days == days));
            let retries = client.retry_calls();
            assert_eq!(retries.len(), 1);
            let expected = before + ChronoDuration::days(i64::from(days));
            assert!((retries[0].1 - expected).num_seconds().abs() < 5);
            assert!(client.pause_calls().is_empty());
        }
    }

    #[tokio::test]
    async fn fourth_attempt_pauses_without_retry() {
        let client = Arc::new(InMemoryCommerceClient::new());

        let outcome = scheduler(client.clone())
            .handle_failed_attempt("s1", 4)
            .await
            .unwrap();

        assert_eq!(outcome, RetryOutcome::Paused { attempt_number: 4 });
        assert_eq!(client.pause_calls(), vec!["s1".to_string()]);
        assert!(client.retry_calls().is_empty());
    }

    #[tokio::test]
    async fn user_errors_become_retry_scheduling_failed() {
        let client = Arc::new(InMemoryCommerceClient::new().fail_on(
            "schedule_retry",
            OutboundError::UserErrors {
                operation: "subscriptionPaymentRetry",
                errors: vec![UserError {
                    field: None,
                    message: "Contract is not active".into(),
                }],
            },
        ));

        let err = scheduler(client).handle_failed_attempt("s1", 2).await.unwrap_err();

        match err {
            WebhookError::RetrySchedulingFailed {
                subscription_id,
                attempt_number,
                ..
            } => {
                assert_eq!(subscription_id, "s1");
                assert_eq!(attempt_number, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn pause_failure_carries_context() {
        let client = Arc::new(
            InMemoryCommerceClient::new().fail_on("pause", OutboundError::transport("commerce", "reset")),
        );

        let err = scheduler(client).handle_failed_attempt("s9", 5).await.unwrap_err();
        assert!(matches!(
            err,
            WebhookError::PauseFailed { ref subscription_id, attempt_number: 5, .. } if subscription_id == "s9"
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_mutation_times_out() {
        let client = Arc::new(InMemoryCommerceClient::new().with_latency(Duration::from_secs(5)));

        let err = scheduler(client).handle_failed_attempt("s1", 1).await.unwrap_err();
        assert!(matches!(
            err,
            WebhookError::RetrySchedulingFailed {
                source: OutboundError::Timeout { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn outcome_reports_its_decision() {
        let client = Arc::new(InMemoryCommerceClient::new());

        let scheduled = scheduler(client.clone()).handle_failed_attempt("s1", 2).await.unwrap();
        let paused = scheduler(client).handle_failed_attempt("s1", 4).await.unwrap();

        assert_eq!(scheduled.decision().as_str(), "retry_scheduled");
        assert!(scheduled.retry_at().is_some());
        assert_eq!(paused.decision(), RetryDecision::Pause { attempt_number: 4 });
        assert_eq!(paused.decision().as_str(), "paused");
        assert!(paused.retry_at().is_none());
    }
}
