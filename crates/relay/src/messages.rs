use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    System,
    User,
    Assistant,
}

/// One turn of a conversation.
///
/// Keys other than `role` and `content`, such as `name`, are kept as sent and
/// forwarded upstream in their original order.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct Message {
    pub(crate) role: Role,
    pub(crate) content: String,
    #[serde(flatten)]
    pub(crate) extra: Map<String, Value>,
}

/// Body accepted by the chat endpoint.
///
/// The conversation is the only state a client sends; turn order is kept as received.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatRequest {
    pub(crate) messages: Vec<Message>,
}

/// Body sent to the upstream chat completion endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub(crate) model: &'a str,
    pub(crate) messages: &'a [Message],
}
