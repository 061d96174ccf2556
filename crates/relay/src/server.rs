use axum::body::Bytes;
use config::RelayConfig;

use crate::{
    messages::{ChatRequest, CompletionRequest},
    upstream::{Upstream, openai::OpenAiUpstream},
};

/// Shared, read-only state behind the chat endpoint.
pub(crate) struct RelayServer {
    upstream: Box<dyn Upstream>,
    model: String,
}

impl RelayServer {
    pub fn new(config: &RelayConfig) -> crate::Result<Self> {
        let upstream = OpenAiUpstream::new(config)?;

        Ok(Self::with_upstream(config.model.clone(), Box::new(upstream)))
    }

    pub fn with_upstream(model: String, upstream: Box<dyn Upstream>) -> Self {
        Self { upstream, model }
    }

    /// Forward one conversation upstream, pairing it with the configured model.
    pub async fn chat(&self, request: ChatRequest) -> crate::Result<Bytes> {
        let completion = CompletionRequest {
            model: &self.model,
            messages: &request.messages,
        };

        log::debug!(
            "Forwarding {} messages to {} with model {}",
            request.messages.len(),
            self.upstream.name(),
            self.model
        );

        self.upstream.complete(&completion).await
    }
}
