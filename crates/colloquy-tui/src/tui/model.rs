use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable identity for a message, used to key per-message view state.
pub type MessageId = String;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a conversation.
///
/// `content` is Markdown and may be partial while the message is still being
/// produced; the renderer never learns "production ended" directly and infers
/// it instead (see [`crate::tui::streaming`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// True while awaiting the first token of a response.
    #[serde(default)]
    pub is_thinking: bool,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content: content.into(),
            timestamp: OffsetDateTime::now_utc(),
            is_thinking: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// An assistant message that has not produced its first token yet.
    pub fn thinking() -> Self {
        Self {
            is_thinking: true,
            ..Self::new(Role::Assistant, "")
        }
    }
}

pub fn generate_message_id() -> MessageId {
    ulid::Ulid::new().to_string()
}
