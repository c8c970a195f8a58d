// src/notify.rs

//! Notification delivery.
//!
//! Fire-and-forget from the pipeline's perspective: a failed delivery is
//! logged by the caller and never rolls back the seen-set write.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{Listing, NotifierConfig};

/// Contract for notification sinks.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver one message for a newly observed listing.
    async fn notify(&self, listing: &Listing) -> Result<()>;
}

/// Webhook notifier posting one JSON message per listing.
pub struct WebhookNotifier {
    client: reqwest::Client,
    webhook_url: String,
}

impl WebhookNotifier {
    /// Create a notifier for the configured webhook endpoint.
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            webhook_url: config.webhook_url.clone(),
        })
    }
}

#[async_trait]
impl Notify for WebhookNotifier {
    async fn notify(&self, listing: &Listing) -> Result<()> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&json!({ "content": listing.render_message() }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::notify(format!(
                "webhook returned HTTP {status}"
            )));
        }
        Ok(())
    }
}
