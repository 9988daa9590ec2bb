//! HTTP provider for OpenRouter-compatible endpoints

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::provider::ModelProvider;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::time::Duration;

/// `reqwest`-backed provider
#[derive(Debug, Clone)]
pub struct HttpProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpProvider {
    /// Build from configuration, reading the key from `api_key_env`
    ///
    /// # Errors
    /// `ProviderError::Request` if the client cannot be built
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(var = %config.api_key_env, "no API key set, sending unauthenticated requests");
        }

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    /// With explicit bearer key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Target URL
    #[inline]
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// True if requests carry a bearer key
    #[inline]
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl ModelProvider for HttpProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        tracing::debug!(endpoint = %self.endpoint, model = %request.model, "sending chat request");

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "provider returned error status");
            return Err(ProviderError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|err| ProviderError::MalformedResponse(format!("malformed response body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_provider_uses_configured_endpoint() {
        let config = ProviderConfig::default()
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions")
            .with_timeout_secs(1);
        let provider = HttpProvider::new(&config).unwrap().with_api_key("sk-test");

        assert_eq!(provider.endpoint(), "http://127.0.0.1:9/v1/chat/completions");
        assert!(provider.has_api_key());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_request_error() {
        let config = ProviderConfig::default()
            .with_endpoint("http://127.0.0.1:9/v1/chat/completions")
            .with_timeout_secs(2);
        let provider = HttpProvider::new(&config).unwrap();

        let err = provider.complete(ChatRequest::new("m")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Request(_)));
    }
}
