//! Client for the Folio chat relay.
//!
//! Holds the conversation in memory and sends all of it, prefixed with a
//! system context, on every call. Failures are turned into a fixed apology
//! for display; the cause only goes to the log.

#![deny(missing_docs)]

mod conversation;
mod error;

pub use conversation::{Conversation, Message, Role};
pub use error::ClientError;
use serde::{Deserialize, Serialize};

/// Shown in place of a reply when the relay call fails.
pub const APOLOGY: &str = "An error occurred while getting a response. Please try again later.";

/// Shown when the relay succeeds but the completion carries no text.
pub const NO_CONTENT_REPLY: &str = "I'm sorry, I couldn't process that.";

const DEFAULT_API_PATH: &str = "/api";
const DEFAULT_HEALTH_PATH: &str = "/api/health";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RelayErrorBody {
    error: Option<String>,
}

/// HTTP client for the relay endpoints.
#[derive(Debug, Clone)]
pub struct ChatClient {
    base_url: String,
    api_path: String,
    health_path: String,
    client: reqwest::Client,
}

impl ChatClient {
    /// Create a client for the relay at `base_url`, e.g. `http://localhost:3001`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_path: DEFAULT_API_PATH.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different mount path for the chat endpoint than `/api`.
    pub fn with_api_path(mut self, path: impl Into<String>) -> Self {
        self.api_path = path.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a different health check path than `/api/health`.
    ///
    /// The server configures it apart from the chat mount path.
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}/{endpoint}", self.base_url, self.api_path)
    }

    fn health_url(&self) -> String {
        format!("{}{}", self.base_url, self.health_path)
    }

    /// Whether the relay answers its health check. Used to show a
    /// "server unavailable" state before any chat call.
    pub async fn check_health(&self) -> bool {
        match self.client.get(self.health_url()).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                log::warn!("Chat relay health check failed: {e}");
                false
            }
        }
    }

    /// Send `messages` to the relay and return the first completion text, if any.
    pub async fn complete(&self, messages: &[Message]) -> Result<Option<String>, ClientError> {
        let response = self
            .client
            .post(self.url("chat"))
            .json(&ChatRequest { messages })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RelayErrorBody>(&body)
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "An error occurred".to_string());

            return Err(ClientError::Relay {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse =
            serde_json::from_slice(&body).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content))
    }

    /// Add `text` as a user turn, ask the relay, record and return the reply.
    ///
    /// Never fails: errors produce [`APOLOGY`] as the assistant turn.
    pub async fn send(&self, conversation: &mut Conversation, text: impl Into<String>) -> String {
        conversation.push(Message::user(text));

        let reply = match self.complete(&conversation.request_messages()).await {
            Ok(Some(content)) => content,
            Ok(None) => NO_CONTENT_REPLY.to_string(),
            Err(e) => {
                log::error!("Error fetching chatbot response: {e}");
                APOLOGY.to_string()
            }
        };

        conversation.push(Message::assistant(reply.clone()));

        reply
    }
}
