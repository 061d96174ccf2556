pub(crate) mod openai;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::messages::CompletionRequest;

/// A chat completion API the relay forwards conversations to.
///
/// Implementations perform exactly one round trip per call. On success they
/// return the upstream body untouched, already checked to be valid JSON.
#[async_trait]
pub(crate) trait Upstream: Send + Sync {
    /// Forward a completion request upstream.
    async fn complete(&self, request: &CompletionRequest<'_>) -> crate::Result<Bytes>;

    /// Short name used in logs.
    fn name(&self) -> &str;
}
