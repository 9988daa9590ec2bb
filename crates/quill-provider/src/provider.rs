//! Provider trait

use crate::error::ProviderError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Source of chat completions
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Send one request and return the decoded response
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError>;
}

#[async_trait]
impl<P: ModelProvider + ?Sized> ModelProvider for Arc<P> {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        (**self).complete(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl ModelProvider for Echo {
        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            Ok(ChatResponse::from_content(request.user_prompt().unwrap_or_default()))
        }
    }

    #[tokio::test]
    async fn arc_provider_delegates() {
        let provider: Arc<dyn ModelProvider> = Arc::new(Echo);
        let request = ChatRequest::new("m").with_message(crate::types::ChatMessage::user("ping"));

        let response = provider.complete(request).await.unwrap();
        assert_eq!(response.content().unwrap(), "ping");
    }
}
