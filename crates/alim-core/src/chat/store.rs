//! Authoritative in-memory session collection.
//!
//! `SessionStore` owns the session list and the active-session pointer,
//! and keeps both in step with durable storage. It enforces the
//! cross-cutting invariants of the conversation history:
//!
//! - the collection is never empty while the store is alive,
//! - exactly one session is active and its id always resolves,
//! - session and message ids are globally unique,
//! - every content mutation rewrites the persisted snapshot.

use super::message::ChatMessage;
use super::model::ChatSession;
use super::repository::SnapshotRepository;
use crate::error::{AlimError, Result};
use std::sync::Arc;

/// The authoritative store for all chat sessions.
///
/// All user intents that touch conversation state flow through this
/// type. Mutations run to completion synchronously (the execution model
/// is single-writer and event-driven), then schedule a full-snapshot
/// save. Storage failures are logged and swallowed: losing a save must
/// never crash the conversation.
pub struct SessionStore {
    /// Sessions in creation order, newest first.
    sessions: Vec<ChatSession>,
    /// Id of the session currently targeted by new messages.
    active_id: String,
    /// Durable storage for the full snapshot.
    repository: Arc<dyn SnapshotRepository>,
}

impl SessionStore {
    /// Creates a store backed by the given snapshot repository.
    ///
    /// The store starts empty; call [`initialize`](Self::initialize)
    /// before use to restore prior state or create the first session.
    pub fn new(repository: Arc<dyn SnapshotRepository>) -> Self {
        Self {
            sessions: Vec::new(),
            active_id: String::new(),
            repository,
        }
    }

    /// Restores persisted sessions, or creates the first session.
    ///
    /// A non-empty loaded snapshot is adopted with its entries
    /// normalized to `last_modified` descending, so position 0 (which
    /// becomes the active session) is always the most recently touched
    /// one regardless of the order the snapshot was written in. Load
    /// failures fall back to a fresh session and are never surfaced.
    pub async fn initialize(&mut self) {
        match self.repository.load().await {
            Ok(Some(mut sessions)) if !sessions.is_empty() => {
                sessions.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
                tracing::info!(count = sessions.len(), "restored chat sessions");
                self.active_id = sessions[0].id.clone();
                self.sessions = sessions;
            }
            Ok(_) => {
                self.create_session();
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load chat sessions, starting fresh");
                self.create_session();
            }
        }
    }

    /// Creates a new session and makes it active.
    ///
    /// The session starts with the bootstrap greeting and is prepended
    /// to the collection. Creation itself does not write storage; the
    /// first content mutation does.
    pub fn create_session(&mut self) -> &ChatSession {
        let session = ChatSession::new();
        self.active_id = session.id.clone();
        self.sessions.insert(0, session);
        &self.sessions[0]
    }

    /// Deletes the session with the given id.
    ///
    /// If the deleted session was active, the first remaining session is
    /// promoted; if none remain, a fresh session is created so the
    /// collection is never empty. The resulting snapshot is persisted as
    /// part of this call, so a deleted session cannot resurrect on
    /// reload. An unknown id is a no-op.
    pub async fn delete_session(&mut self, id: &str) {
        let Some(index) = self.sessions.iter().position(|s| s.id == id) else {
            tracing::debug!(session_id = %id, "delete ignored, unknown session");
            return;
        };
        self.sessions.remove(index);

        if self.active_id == id {
            match self.sessions.first().map(|s| s.id.clone()) {
                Some(next) => self.active_id = next,
                None => {
                    self.create_session();
                }
            }
        }
        self.persist().await;
    }

    /// Appends a message to the addressed session.
    ///
    /// Updates `last_modified`, derives the title when it is still the
    /// sentinel default, and persists. An unknown session id is a no-op.
    pub async fn append_message(&mut self, session_id: &str, message: ChatMessage) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            tracing::warn!(session_id = %session_id, "append ignored, unknown session");
            return;
        };
        session.messages.push(message);
        session.last_modified = chrono::Utc::now().timestamp_millis();
        session.derive_title();
        self.persist().await;
    }

    /// Flips the favorite flag on a message within the given session.
    ///
    /// Updates the owning session's `last_modified` and persists. An
    /// unknown message id is a no-op, not an error.
    pub async fn toggle_favorite(&mut self, session_id: &str, message_id: &str) {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            return;
        };
        let Some(message) = session.messages.iter_mut().find(|m| m.id == message_id) else {
            return;
        };
        message.is_favorite = !message.is_favorite;
        session.last_modified = chrono::Utc::now().timestamp_millis();
        self.persist().await;
    }

    /// Flips the favorite flag on a message wherever it lives.
    ///
    /// The favorites view only knows message ids, so this scans all
    /// sessions for the owner and delegates to
    /// [`toggle_favorite`](Self::toggle_favorite).
    pub async fn toggle_favorite_anywhere(&mut self, message_id: &str) {
        let owner = self
            .sessions
            .iter()
            .find(|s| s.messages.iter().any(|m| m.id == message_id))
            .map(|s| s.id.clone());
        if let Some(session_id) = owner {
            self.toggle_favorite(&session_id, message_id).await;
        }
    }

    /// Makes the session with the given id active.
    ///
    /// # Errors
    ///
    /// Returns [`AlimError::NotFound`] if no session has that id.
    pub fn select_session(&mut self, id: &str) -> Result<()> {
        if !self.sessions.iter().any(|s| s.id == id) {
            return Err(AlimError::not_found("session", id));
        }
        self.active_id = id.to_string();
        Ok(())
    }

    /// Messages of the active session.
    ///
    /// Falls back to an empty slice if the active id cannot be resolved;
    /// given the store invariants that should not occur.
    pub fn current_messages(&self) -> &[ChatMessage] {
        self.sessions
            .iter()
            .find(|s| s.id == self.active_id)
            .map(|s| s.messages.as_slice())
            .unwrap_or(&[])
    }

    /// Id of the active session.
    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Read view of the full session collection.
    pub fn snapshot(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Sign-out: clears durable storage and starts over with one fresh session.
    pub async fn reset(&mut self) {
        if let Err(e) = self.repository.clear().await {
            tracing::warn!(error = %e, "failed to clear persisted sessions");
        }
        self.sessions.clear();
        self.create_session();
    }

    /// Writes the full snapshot to durable storage.
    ///
    /// Never writes an empty collection, and never propagates storage
    /// failures; the conversation must survive a broken disk.
    async fn persist(&self) {
        if self.sessions.is_empty() {
            return;
        }
        if let Err(e) = self.repository.save(&self.sessions).await {
            tracing::warn!(error = %e, "failed to persist chat sessions");
        }
    }
}
