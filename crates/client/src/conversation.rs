use serde::{Deserialize, Serialize};

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the whole conversation.
    System,
    /// Text typed by the visitor.
    User,
    /// Text produced by the model.
    Assistant,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    /// Who wrote the turn.
    pub role: Role,
    /// The turn text.
    pub content: String,
}

impl Message {
    /// A system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// In-memory conversation history.
///
/// The relay keeps no state, so this is the only copy of what was said. It
/// lives as long as the value and is never persisted.
#[derive(Debug, Clone)]
pub struct Conversation {
    system_context: String,
    turns: Vec<Message>,
}

impl Conversation {
    /// Starts an empty conversation framed by `system_context`.
    pub fn new(system_context: impl Into<String>) -> Self {
        Self {
            system_context: system_context.into(),
            turns: Vec::new(),
        }
    }

    /// The exchanged turns, oldest first. The system context is not included.
    pub fn messages(&self) -> &[Message] {
        &self.turns
    }

    /// Whether nothing has been exchanged yet.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Appends a turn.
    pub fn push(&mut self, message: Message) {
        self.turns.push(message);
    }

    /// Forgets every exchanged turn, keeping the system context.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// The messages to send to the relay: the system context followed by every turn.
    pub fn request_messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.turns.len() + 1);

        messages.push(Message::system(self.system_context.clone()));
        messages.extend(self.turns.iter().cloned());

        messages
    }
}
