//! Bounded exponential backoff around summarization calls
//!
//! Only quota/rate-limit failures are retried. Everything else is treated as
//! non-transient and returned on the first occurrence.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::RetryConfig;
use crate::error::{Error, Result};

/// Decides whether an error is an upstream quota/rate-limit signal
#[derive(Debug, Clone)]
pub struct QuotaClassifier {
    /// Lowercased markers
    markers: Vec<String>,
}

impl QuotaClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(|m| m.as_ref().to_lowercase())
                .filter(|m| !m.is_empty())
                .collect(),
        }
    }

    pub fn is_quota(&self, error: &Error) -> bool {
        if matches!(error, Error::QuotaExceeded { .. }) {
            return true;
        }
        let text = error.to_string().to_lowercase();
        self.markers.iter().any(|m| text.contains(m.as_str()))
    }
}

impl Default for QuotaClassifier {
    fn default() -> Self {
        Self::new(RetryConfig::default().quota_markers)
    }
}

/// Retries quota failures with `base_delay * 2^attempt` pauses
#[derive(Debug, Clone)]
pub struct RetryingInvoker {
    max_attempts: u32,
    base_delay: Duration,
    classifier: QuotaClassifier,
}

impl RetryingInvoker {
    pub fn new(max_attempts: u32, base_delay: Duration, classifier: QuotaClassifier) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            classifier,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.base_delay(),
            QuotaClassifier::new(&config.quota_markers),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn classifier(&self) -> &QuotaClassifier {
        &self.classifier
    }

    /// Delay before retrying after the zero-based `attempt` failed
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Run `operation`, retrying quota failures until the attempt budget is spent.
    ///
    /// Fails with [`Error::QuotaExceeded`] once every attempt hit a quota error;
    /// any other error is returned unchanged on first sight.
    pub async fn invoke<F, Fut, T>(&self, label: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut last_message = String::new();

        for attempt in 0..self.max_attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if self.classifier.is_quota(&e) => {
                    last_message = e.to_string();
                    if attempt + 1 < self.max_attempts {
                        let delay = self.delay_for(attempt);
                        tracing::warn!(
                            "Rate limited on {} (attempt {}/{}), retrying in {:?}",
                            label,
                            attempt + 1,
                            self.max_attempts,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        tracing::warn!(
            "Rate limit persisted for {} after {} attempts",
            label,
            self.max_attempts
        );
        Err(Error::QuotaExceeded {
            attempts: self.max_attempts,
            message: last_message,
        })
    }
}

impl Default for RetryingInvoker {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_invoker(max_attempts: u32) -> RetryingInvoker {
        RetryingInvoker::new(
            max_attempts,
            Duration::from_millis(1),
            QuotaClassifier::default(),
        )
    }

    #[test]
    fn test_classifier_markers() {
        let classifier = QuotaClassifier::default();

        assert!(classifier.is_quota(&Error::summarizer("RESOURCE_EXHAUSTED: try later")));
        assert!(classifier.is_quota(&Error::summarizer(
            "Gemini generation failed (429 Too Many Requests): {}"
        )));
        assert!(classifier.is_quota(&Error::summarizer("Daily Quota reached")));
        assert!(classifier.is_quota(&Error::QuotaExceeded {
            attempts: 1,
            message: String::new(),
        }));
        assert!(!classifier.is_quota(&Error::summarizer("connection reset")));
        assert!(!classifier.is_quota(&Error::internal("boom")));
    }

    #[test]
    fn test_delay_doubles() {
        let invoker = RetryingInvoker::new(3, Duration::from_secs(40), QuotaClassifier::default());

        assert_eq!(invoker.delay_for(0), Duration::from_secs(40));
        assert_eq!(invoker.delay_for(1), Duration::from_secs(80));
        assert_eq!(invoker.delay_for(2), Duration::from_secs(160));
        // Saturates instead of overflowing
        assert!(invoker.delay_for(64) >= Duration::from_secs(40));
    }

    #[test]
    fn test_at_least_one_attempt() {
        assert_eq!(fast_invoker(0).max_attempts(), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_quota() {
        let invoker = fast_invoker(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let value = invoker
            .invoke("chunk", || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(Error::summarizer("resource_exhausted"))
                } else {
                    Ok(7)
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_quota_exhausts_attempts() {
        let invoker = fast_invoker(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let err = invoker
            .invoke("chunk", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::summarizer("quota exceeded"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::QuotaExceeded { attempts: 3, .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let invoker = fast_invoker(3);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let err = invoker
            .invoke("chunk", || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(Error::summarizer("invalid JSON"))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Summarizer(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_waits_full_schedule() {
        let invoker = RetryingInvoker::new(3, Duration::from_secs(40), QuotaClassifier::default());
        let start = tokio::time::Instant::now();

        let _ = invoker
            .invoke("chunk", || async { Err::<(), _>(Error::summarizer("quota")) })
            .await;

        // 40s + 80s between the three attempts
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(120));
        assert!(elapsed < Duration::from_secs(121));
    }
}
