//! Session domain model.
//!
//! A `ChatSession` is one conversation thread: a titled, ordered
//! sequence of messages with creation and last-modification times.

use crate::chat::message::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Placeholder title every new session starts with.
///
/// Acts as the sentinel for lazy title derivation: the title is derived
/// from the first user message exactly once, while it still equals this
/// value.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Fixed greeting message every new session starts with.
pub const WELCOME_TEXT: &str = "As-salamu Alaykum. I am Al-Alim. How can I help you today?";

/// Maximum derived title length before truncation.
pub const TITLE_MAX_CHARS: usize = 35;

/// One conversation thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session identifier (UUID format), never reused.
    pub id: String,
    /// Human-readable session label.
    pub title: String,
    /// Messages in conversation order.
    pub messages: Vec<ChatMessage>,
    /// Creation time in milliseconds since the UNIX epoch.
    pub created_at: i64,
    /// Time of the most recent message mutation, in milliseconds.
    pub last_modified: i64,
}

impl ChatSession {
    /// Creates a fresh session containing only the bootstrap greeting.
    pub fn new() -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: vec![ChatMessage::assistant(WELCOME_TEXT)],
            created_at: now,
            last_modified: now,
        }
    }

    /// Conversation history without the bootstrap greeting.
    ///
    /// This is the view handed to the generative backend.
    pub fn history(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| !m.is_bootstrap())
    }

    /// Derives the title from the first user message, once.
    ///
    /// Runs only while the title is still the sentinel default and the
    /// session holds more than the bootstrap message; re-entry after the
    /// first derivation is a no-op. The derived title is the user text
    /// truncated to [`TITLE_MAX_CHARS`] characters, with `...` appended
    /// when truncation occurred.
    pub(crate) fn derive_title(&mut self) {
        if self.title != DEFAULT_TITLE || self.messages.len() <= 1 {
            return;
        }
        if let Some(first_user) = self.messages.iter().find(|m| m.role == MessageRole::User) {
            self.title = truncate_title(&first_user.text);
            tracing::debug!(session_id = %self.id, title = %self.title, "derived session title");
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let truncated: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}
