//! Retry with exponential backoff for calls to external HTTP APIs.

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryConfig {
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt as i32 - 1);
        Duration::from_millis(millis as u64).min(self.max_delay)
    }
}

/// Run `f` until it succeeds, the error stops being retryable, or the
/// attempts run out. The last error is returned on exhaustion.
pub async fn retry_with_backoff<F, T, E, Fut>(
    config: &RetryConfig,
    mut f: F,
    is_retryable: impl Fn(&E) -> bool,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts {
        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(attempt, "succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => {
                let retryable = is_retryable(&e);
                last_error = Some(e);
                if attempt < config.max_attempts && retryable {
                    let delay = config.delay_for_attempt(attempt);
                    warn!(
                        attempt,
                        max_attempts = config.max_attempts,
                        ?delay,
                        "attempt failed, backing off"
                    );
                    sleep(delay).await;
                } else {
                    break;
                }
            }
        }
    }

    Err(last_error.expect("at least one attempt ran"))
}

/// Server errors and throttling are worth retrying; other client errors
/// are not.
pub fn is_http_retryable(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}
