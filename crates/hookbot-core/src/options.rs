use std::time::Duration;

use tracing::Dispatch;

use crate::{config::WebhookConfig, errors::TransportError, webhook::WebhookClient, Result};

/// Unresolved client settings.
///
/// Every field is optional except the credential, which may still be empty
/// here: an empty credential is reported when a send is attempted, before
/// any request goes out.
#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    http: Option<reqwest::Client>,
    logger: Option<Dispatch>,
    base_url: Option<String>,
    credential: String,
    timeout: Option<Duration>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(cfg: WebhookConfig) -> Self {
        Self {
            base_url: cfg.base_url,
            credential: cfg.credential,
            timeout: cfg.timeout,
            ..Self::default()
        }
    }

    /// HTTP client to send with. Takes precedence over [`ClientOptions::timeout`].
    pub fn http(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Dispatcher that receives this client's log events.
    pub fn logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = Some(logger.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = credential.into();
        self
    }

    /// Whole-request timeout for the default HTTP client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Fill in defaults and freeze the settings.
    pub fn resolve(self, provider: &'static str, default_base_url: &str) -> Result<WebhookClient> {
        let http = match self.http {
            Some(http) => http,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                builder.build().map_err(TransportError::Http)?
            }
        };

        let base_url = self
            .base_url
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| default_base_url.to_string());

        Ok(WebhookClient::new(
            provider,
            http,
            self.logger,
            base_url,
            self.credential,
        ))
    }
}
