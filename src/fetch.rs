// src/fetch.rs

//! Page fetching with retry, backoff and rate limiting.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Delay before retry attempt `attempt` (0-based): `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base * 2u32.saturating_pow(attempt)
}

/// HTTP fetcher with bounded retries and a post-success request delay.
///
/// Every failure mode is normalized to an error return; nothing panics
/// past this boundary. Callers treat a terminal failure as an empty
/// result for the URL in question.
pub struct Fetcher {
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
    request_delay: Duration,
}

impl Fetcher {
    /// Create a fetcher from the HTTP configuration.
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries.max(1),
            retry_delay: Duration::from_secs(config.retry_delay_secs),
            request_delay: Duration::from_secs(config.request_delay_secs),
        })
    }

    /// Fetch a page body, retrying with exponential backoff.
    ///
    /// Non-200 statuses and transport errors are both retryable. After a
    /// successful fetch the configured request delay is slept to
    /// rate-limit the source; failed attempts skip that delay.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        for attempt in 0..self.max_retries {
            log::debug!(
                "Fetching {} (attempt {}/{})",
                url,
                attempt + 1,
                self.max_retries
            );

            match self.try_fetch(url).await {
                Ok(body) => {
                    if !self.request_delay.is_zero() {
                        tokio::time::sleep(self.request_delay).await;
                    }
                    return Ok(body);
                }
                Err(e) => {
                    log::warn!("Fetch failed for {}: {}", url, e);
                }
            }

            // No wait after the final attempt
            if attempt + 1 < self.max_retries {
                let delay = backoff_delay(self.retry_delay, attempt);
                log::info!("Retrying {} in {:?}", url, delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(AppError::fetch(
            url,
            format!("failed after {} attempts", self.max_retries),
        ))
    }

    async fn try_fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::fetch(url, format!("HTTP {status}")));
        }
        Ok(response.text().await?)
    }
}
