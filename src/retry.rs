//! Bounded retry for outbound model calls

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::HttpConfig;
use crate::errors::Result;

/// Retry budget for one outbound call
///
/// Only transient failures are retried, waiting `backoff * attempt` between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// A policy that makes exactly one attempt
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Run `call` until it succeeds, fails permanently, or the budget is spent
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt <= self.max_retries => {
                    warn!(
                        "Attempt {}/{}: {} failed: {}",
                        attempt,
                        self.max_retries + 1,
                        operation,
                        e
                    );
                    tokio::time::sleep(self.backoff * attempt as u32).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
