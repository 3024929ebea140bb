//! Retry with exponential backoff for calls to the generative service

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetryConfig;

/// Exponential backoff policy
///
/// Every failure is retried until the budget runs out; the delay before retry
/// `n` (1-based) is `base_delay * 2^(n-1)`, capped at `max_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            retries: config.retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.base_delay_ms)),
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits; for tests and one-shot tools
    pub fn immediate(retries: u32) -> Self {
        Self {
            retries,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before the given retry (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// All delays this policy would wait through, in order
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.retries).map(|n| self.delay_for(n)).collect()
    }

    /// Run `op` until it succeeds or the retry budget is spent
    ///
    /// Returns the last error once every retry has failed.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        debug!(%label, retries = self.retries, "run: called");
        let mut retry = 0;
        loop {
            match op().await {
                Ok(value) => {
                    debug!(%label, retry, "run: success");
                    return Ok(value);
                }
                Err(e) if retry < self.retries => {
                    retry += 1;
                    let backoff = self.delay_for(retry);
                    warn!(
                        %label,
                        attempt = retry,
                        remaining = self.retries - retry + 1,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "run: call failed, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    warn!(%label, retries = self.retries, error = %e, "run: retries exhausted");
                    return Err(e);
                }
            }
        }
    }
}
