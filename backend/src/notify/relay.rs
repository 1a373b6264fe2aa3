//! HTTP mail relay notifier.
//!
//! Posts `{ "from", "to", "subject", "html" }` as JSON to the configured relay
//! endpoint, which is expected to answer 2xx once it has accepted the mail.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::template::render;
use super::{EmailMessage, Notifier, NotifyError};
use crate::config::NotifierConfig;

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Sends rendered email through an HTTP relay.
#[derive(Debug, Clone)]
pub struct RelayNotifier {
    client: reqwest::Client,
    endpoint: String,
    sender: String,
}

impl RelayNotifier {
    pub fn new(endpoint: impl Into<String>, sender: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            sender: sender.into(),
        })
    }

    pub fn from_config(config: &NotifierConfig) -> Result<Self, NotifyError> {
        let endpoint = config
            .relay_url
            .clone()
            .ok_or_else(|| NotifyError::Delivery("relay_url is not configured".to_string()))?;
        Self::new(endpoint, config.sender.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), NotifyError> {
        let html = render(&message.template, &message.data)?;
        let request = RelayRequest {
            from: &self.sender,
            to: &message.recipient,
            subject: &message.subject,
            html: &html,
        };

        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Delivery(format!(
                "relay answered {status}: {body}"
            )));
        }

        log::info!("Email sent to {}: {}", message.recipient, message.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_url() {
        let config = NotifierConfig::default();
        assert!(RelayNotifier::from_config(&config).is_err());

        let config = NotifierConfig {
            relay_url: Some("http://localhost:8025/send".to_string()),
            ..Default::default()
        };
        let notifier = RelayNotifier::from_config(&config).unwrap();
        assert_eq!(notifier.endpoint(), "http://localhost:8025/send");
    }

    #[test]
    fn test_request_shape() {
        let request = RelayRequest {
            from: "a@x",
            to: "b@y",
            subject: "s",
            html: "<p>h</p>",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"], "b@y");
        assert_eq!(json["html"], "<p>h</p>");
    }
}
