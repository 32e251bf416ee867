//! Generative scholar backend trait.

use super::message::ChatMessage;
use anyhow::Result;
use async_trait::async_trait;

/// A reply from the generative backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ScholarReply {
    /// The assistant's response text.
    pub text: String,
    /// Grounding source URIs, when retrieval augmentation was requested.
    pub sources: Vec<String>,
}

/// An opaque asynchronous gateway to the generative AI service.
///
/// The session store treats the backend purely as
/// `send(history, prompt) -> reply`; the system instruction, model
/// selection and transport all live behind the implementation. The
/// history passed in never contains the bootstrap greeting.
///
/// A failed call is recovered by the caller with a fixed apology
/// message; implementations should not retry internally.
#[async_trait]
pub trait ScholarBackend: Send + Sync {
    /// Sends the user's prompt with prior conversation history.
    async fn send(&self, history: &[ChatMessage], prompt: &str) -> Result<ScholarReply>;
}
