//! Retry decorator around any `ModelClient`.
//!
//! Transient failures (transport, timeout, 429, 5xx) are retried with
//! exponential backoff: 1s, 2s, 4s, ... Permanent failures return immediately.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use super::{ModelClient, ModelError, ResponseHint};

const BASE_DELAY_MS: u64 = 1000;

pub struct RetryingClient<C> {
    inner: C,
    max_attempts: u32,
}

impl<C: ModelClient> RetryingClient<C> {
    /// `max_attempts` counts the first call; values below 1 are treated as 1.
    pub fn new(inner: C, max_attempts: u32) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
        }
    }
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(BASE_DELAY_MS << (attempt - 1).min(6))
}

#[async_trait]
impl<C: ModelClient> ModelClient for RetryingClient<C> {
    async fn complete(
        &self,
        prompt: &str,
        hint: Option<&ResponseHint>,
    ) -> Result<String, ModelError> {
        let mut attempt = 1;
        loop {
            match self.inner.complete(prompt, hint).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = backoff(attempt);
                    warn!(
                        "Model call attempt {}/{} failed ({}), retrying after {}ms...",
                        attempt,
                        self.max_attempts,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
