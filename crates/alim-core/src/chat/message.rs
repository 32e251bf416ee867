//! Chat message types.
//!
//! A message is one turn in a conversation: a user prompt or an
//! assistant reply. Messages are immutable after creation except for
//! the favorite flag.

use crate::chat::model::WELCOME_TEXT;
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A single message in a chat session.
///
/// The `id` doubles as the stable identity of the message; it is never
/// reused and never changes. Only `is_favorite` may be flipped after
/// creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The rendered content of the message.
    pub text: String,
    /// Reference URIs for grounded assistant replies; empty otherwise.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    /// Whether the user has marked this message as a favorite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Creation time in milliseconds since the UNIX epoch.
    pub timestamp: i64,
}

impl ChatMessage {
    fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            sources: Vec::new(),
            is_favorite: false,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Creates a user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Creates an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Creates an assistant message carrying grounding source URIs.
    pub fn assistant_with_sources(text: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            sources,
            ..Self::new(MessageRole::Assistant, text)
        }
    }

    /// Whether this is the fixed greeting every new session starts with.
    ///
    /// The greeting is excluded from the history sent to the backend.
    pub fn is_bootstrap(&self) -> bool {
        self.role == MessageRole::Assistant && self.text == WELCOME_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::user("first");
        let b = ChatMessage::user("first");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn bootstrap_detection() {
        assert!(ChatMessage::assistant(WELCOME_TEXT).is_bootstrap());
        assert!(!ChatMessage::user(WELCOME_TEXT).is_bootstrap());
        assert!(!ChatMessage::assistant("something else").is_bootstrap());
    }

    #[test]
    fn sources_roundtrip_and_are_skipped_when_empty() {
        let plain = ChatMessage::assistant("reply");
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("sources"));

        let grounded = ChatMessage::assistant_with_sources(
            "reply",
            vec!["https://example.com/ayah".to_string()],
        );
        let json = serde_json::to_string(&grounded).unwrap();
        let back: ChatMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sources, grounded.sources);
        assert_eq!(back.role, MessageRole::Assistant);
    }
}
