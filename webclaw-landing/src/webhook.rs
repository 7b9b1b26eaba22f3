use std::time::Duration;
use tracing::{debug, error};

use crate::error::LeadError;
use crate::lead::WebhookMessage;

/// Posts lead messages to the team's incoming webhook. One attempt, no retry.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, url: url.into() })
    }

    pub async fn send(&self, message: &WebhookMessage) -> Result<(), LeadError> {
        let response = self
            .http
            .post(&self.url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!("webhook unreachable: {}", e);
                LeadError::WebhookFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("webhook answered {}", status);
            return Err(LeadError::WebhookFailed);
        }
        debug!("lead forwarded ({})", status);
        Ok(())
    }
}
