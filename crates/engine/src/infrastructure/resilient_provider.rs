//! Resilient location provider wrapper with exponential backoff retry
//!
//! Wraps any LocationProviderPort implementation with retry logic to handle
//! transient failures (timeouts, 5xx, throttling).

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use zoinkies_domain::{CellId, LocationCriteria, RawLocation};

use crate::infrastructure::ports::{LocationProviderPort, ProviderError};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
    /// Jitter factor (0.0-1.0) for randomizing delays to prevent thundering herd
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_ms: 250,
            max_delay_ms: 2000,
            jitter_factor: 0.2,
        }
    }
}

/// Wrapper that adds retry logic to any location provider
pub struct ResilientLocationProvider {
    inner: Arc<dyn LocationProviderPort>,
    config: RetryConfig,
}

impl ResilientLocationProvider {
    /// Create a new resilient wrapper around an existing provider
    pub fn new(inner: Arc<dyn LocationProviderPort>, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    /// Calculate delay for a given attempt number using exponential backoff with jitter
    fn calculate_delay(&self, attempt: u32) -> u64 {
        let base = self.config.base_delay_ms;
        // Exponential: base * 2^(attempt-1)
        let exponential = base.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_range = (capped as f64 * self.config.jitter_factor) as i64;
        if jitter_range > 0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..=jitter_range);
            (capped as i64 + jitter).max(0) as u64
        } else {
            capped
        }
    }
}

#[async_trait]
impl LocationProviderPort for ResilientLocationProvider {
    async fn query(
        &self,
        cell: CellId,
        criteria: &LocationCriteria,
    ) -> Result<Vec<RawLocation>, ProviderError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.inner.query(cell, criteria).await {
                Ok(locations) => {
                    if attempt > 0 {
                        tracing::info!(
                            attempt = attempt + 1,
                            cell = %cell,
                            "Provider query succeeded after retry"
                        );
                    }
                    return Ok(locations);
                }
                Err(e) => {
                    if !e.is_transient() {
                        tracing::error!(
                            error = %e,
                            cell = %cell,
                            "Provider query failed with non-retryable error"
                        );
                        return Err(e);
                    }

                    if attempt < self.config.max_retries {
                        let delay = self.calculate_delay(attempt + 1);
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = self.config.max_retries,
                            delay_ms = delay,
                            error = %e,
                            cell = %cell,
                            "Provider query failed, retrying..."
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                    }

                    last_error = Some(e);
                }
            }
        }

        let error = last_error
            .unwrap_or_else(|| ProviderError::RequestFailed("Unknown error".to_string()));
        tracing::error!(
            attempts = self.config.max_retries + 1,
            error = %error,
            cell = %cell,
            "Provider query failed after all retry attempts"
        );
        Err(error)
    }
}
