use crate::core::config::RetryConfig;
use crate::errors::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self { attempts, backoff }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.click_attempts, Duration::from_millis(config.backoff_ms))
    }

    /// Runs `op` until it succeeds or `attempts` runs have failed, sleeping
    /// `backoff` between runs. The last failure is returned unchanged.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        info!(label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt < attempts => {
                    warn!(label, attempt, attempts, error = %err, "attempt failed, retrying");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::E2eError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_three_attempts() {
        let runs = AtomicU32::new(0);
        let started = Instant::now();

        let result: Result<()> = RetryPolicy::default()
            .run("always fails", |attempt| {
                runs.fetch_add(1, Ordering::SeqCst);
                async move { Err(E2eError::Dialog(format!("attempt {}", attempt))) }
            })
            .await;

        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(matches!(result, Err(E2eError::Dialog(ref m)) if m == "attempt 3"));
        // two backoffs, none after the final attempt
        assert_eq!(started.elapsed(), Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_first_success() {
        let runs = AtomicU32::new(0);

        let value = RetryPolicy::new(5, Duration::from_millis(10))
            .run("second time lucky", |attempt| {
                runs.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(E2eError::blocked("#submit", "covered"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(value, 2);
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_runs_once() {
        let result = RetryPolicy::new(0, Duration::ZERO)
            .run("once", |_| async { Ok::<_, E2eError>(7) })
            .await;
        assert_eq!(result.unwrap(), 7);
    }
}
