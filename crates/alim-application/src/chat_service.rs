//! Chat use case implementation.
//!
//! `ChatService` owns the session store and drives it with explicit
//! intents instead of scattered callbacks, so every mutation path and
//! its persistence trigger is visible in one place. It also runs the
//! asynchronous exchange with the generative backend, pinning replies
//! to the session that originated them.

use alim_core::chat::{
    ChatMessage, ChatSession, GroupedSessions, ScholarBackend, SessionStore, SnapshotRepository,
    favorites, group_by_recency,
};
use alim_core::error::Result;
use alim_infrastructure::JsonSnapshotRepository;
use chrono::{DateTime, Local};
use std::sync::Arc;

/// Fixed assistant message appended when the backend call fails.
pub const APOLOGY_TEXT: &str =
    "I am having trouble accessing the knowledge base. Please try again.";

/// A user intent against the conversation state.
///
/// The view layer dispatches these instead of holding mutation
/// closures; stale captures of the active session cannot occur because
/// all routing happens inside the service at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatIntent {
    /// Start a new conversation and make it active.
    NewSession,
    /// Delete the session with this id.
    DeleteSession(String),
    /// Make the session with this id active.
    SelectSession(String),
    /// Send a user prompt to the active session.
    SendMessage(String),
    /// Flip the favorite flag on the message with this id, wherever it lives.
    ToggleFavorite(String),
}

/// Orchestrates the session store and the generative backend.
pub struct ChatService {
    store: SessionStore,
    backend: Arc<dyn ScholarBackend>,
}

impl ChatService {
    /// Creates a service over the given storage and backend.
    pub fn new(repository: Arc<dyn SnapshotRepository>, backend: Arc<dyn ScholarBackend>) -> Self {
        Self {
            store: SessionStore::new(repository),
            backend,
        }
    }

    /// Creates a service persisting to the default location (`~/.alim`).
    ///
    /// # Errors
    ///
    /// Returns an error if the storage directory cannot be prepared.
    pub fn open_default(backend: Arc<dyn ScholarBackend>) -> anyhow::Result<Self> {
        let repository = Arc::new(JsonSnapshotRepository::default_location()?);
        Ok(Self::new(repository, backend))
    }

    /// Restores persisted sessions, or creates the first one.
    pub async fn initialize(&mut self) {
        self.store.initialize().await;
    }

    /// Applies a user intent to the conversation state.
    ///
    /// # Errors
    ///
    /// Only `SelectSession` with an unknown id fails; every other
    /// intent degrades internally (no-ops, apology messages) as the
    /// store's error policy dictates.
    pub async fn dispatch(&mut self, intent: ChatIntent) -> Result<()> {
        match intent {
            ChatIntent::NewSession => {
                self.store.create_session();
                Ok(())
            }
            ChatIntent::DeleteSession(id) => {
                self.store.delete_session(&id).await;
                Ok(())
            }
            ChatIntent::SelectSession(id) => self.store.select_session(&id),
            ChatIntent::SendMessage(text) => {
                self.send_message(&text).await;
                Ok(())
            }
            ChatIntent::ToggleFavorite(message_id) => {
                self.store.toggle_favorite_anywhere(&message_id).await;
                Ok(())
            }
        }
    }

    /// Sends a user prompt and appends the backend's reply.
    ///
    /// The originating session id is captured by value before the
    /// backend call, so a late reply lands in the conversation that
    /// asked for it, never in whichever session happens to be active
    /// when the call resolves. A backend failure is converted into the
    /// fixed apology message; it is not retried and not stored any
    /// differently from a normal reply.
    pub async fn send_message(&mut self, text: &str) {
        let origin_id = self.store.active_id().to_string();

        // History excludes the bootstrap greeting and the prompt itself.
        let history: Vec<ChatMessage> = self
            .store
            .current_messages()
            .iter()
            .filter(|m| !m.is_bootstrap())
            .cloned()
            .collect();

        self.store
            .append_message(&origin_id, ChatMessage::user(text))
            .await;

        let reply = match self.backend.send(&history, text).await {
            Ok(reply) => ChatMessage::assistant_with_sources(reply.text, reply.sources),
            Err(e) => {
                tracing::warn!(error = %e, "scholar backend failed, appending apology");
                ChatMessage::assistant(APOLOGY_TEXT)
            }
        };
        self.store.append_message(&origin_id, reply).await;
    }

    /// Sign-out: wipes persisted history and starts a fresh session.
    pub async fn sign_out(&mut self) {
        self.store.reset().await;
    }

    /// Messages of the active session.
    pub fn current_messages(&self) -> &[ChatMessage] {
        self.store.current_messages()
    }

    /// Id of the active session.
    pub fn active_session_id(&self) -> &str {
        self.store.active_id()
    }

    /// Read view of all sessions.
    pub fn sessions(&self) -> &[ChatSession] {
        self.store.snapshot()
    }

    /// Sessions grouped by recency for the history sidebar.
    pub fn grouped_history(&self, now: DateTime<Local>) -> GroupedSessions<'_> {
        group_by_recency(self.store.snapshot(), now)
    }

    /// Every favorite-marked message across all sessions.
    pub fn favorites(&self) -> Vec<&ChatMessage> {
        favorites(self.store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alim_core::chat::{MessageRole, ScholarReply};
    use anyhow::Result as AnyResult;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemorySnapshotRepository {
        stored: Mutex<Option<Vec<ChatSession>>>,
    }

    #[async_trait]
    impl SnapshotRepository for MemorySnapshotRepository {
        async fn load(&self) -> AnyResult<Option<Vec<ChatSession>>> {
            Ok(self.stored.lock().unwrap().clone())
        }

        async fn save(&self, sessions: &[ChatSession]) -> AnyResult<()> {
            *self.stored.lock().unwrap() = Some(sessions.to_vec());
            Ok(())
        }

        async fn clear(&self) -> AnyResult<()> {
            *self.stored.lock().unwrap() = None;
            Ok(())
        }
    }

    /// Scripted backend: records the history it was handed.
    struct ScriptedBackend {
        reply: AnyResult<ScholarReply>,
        seen_history: Mutex<Vec<usize>>,
    }

    impl ScriptedBackend {
        fn replying(text: &str, sources: Vec<String>) -> Self {
            Self {
                reply: Ok(ScholarReply {
                    text: text.to_string(),
                    sources,
                }),
                seen_history: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: Err(anyhow::anyhow!("quota exceeded")),
                seen_history: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScholarBackend for ScriptedBackend {
        async fn send(&self, history: &[ChatMessage], _prompt: &str) -> AnyResult<ScholarReply> {
            self.seen_history.lock().unwrap().push(history.len());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    async fn service_with(backend: Arc<ScriptedBackend>) -> ChatService {
        let mut service = ChatService::new(Arc::new(MemorySnapshotRepository::default()), backend);
        service.initialize().await;
        service
    }

    #[tokio::test]
    async fn send_appends_prompt_and_reply() {
        let backend = Arc::new(ScriptedBackend::replying(
            "Zakat is one of the five pillars.",
            vec!["https://example.com/ref".to_string()],
        ));
        let mut service = service_with(backend.clone()).await;

        service
            .dispatch(ChatIntent::SendMessage("What is Zakat?".to_string()))
            .await
            .unwrap();

        let messages = service.current_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].text, "What is Zakat?");
        assert_eq!(messages[2].role, MessageRole::Assistant);
        assert_eq!(messages[2].text, "Zakat is one of the five pillars.");
        assert_eq!(messages[2].sources, vec!["https://example.com/ref"]);

        // Title derives from the first user prompt
        assert_eq!(service.sessions()[0].title, "What is Zakat?");

        // The bootstrap greeting and the prompt itself stay out of the history
        assert_eq!(*backend.seen_history.lock().unwrap(), vec![0]);
    }

    #[tokio::test]
    async fn backend_failure_appends_exactly_one_apology() {
        let mut service = service_with(Arc::new(ScriptedBackend::failing())).await;
        let before = service.sessions()[0].last_modified;

        service
            .dispatch(ChatIntent::SendMessage("What is Zakat?".to_string()))
            .await
            .unwrap();

        let messages = service.current_messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, MessageRole::Assistant);
        assert_eq!(messages[2].text, APOLOGY_TEXT);
        assert!(messages[2].sources.is_empty());
        assert!(service.sessions()[0].last_modified >= before);
    }

    #[tokio::test]
    async fn history_grows_across_turns() {
        let backend = Arc::new(ScriptedBackend::replying("answer", Vec::new()));
        let mut service = service_with(backend.clone()).await;

        service.send_message("first").await;
        service.send_message("second").await;

        // Second call sees the first exchange (prompt + reply), bootstrap excluded
        assert_eq!(*backend.seen_history.lock().unwrap(), vec![0, 2]);
    }

    #[tokio::test]
    async fn intents_cover_the_session_lifecycle() {
        let mut service = service_with(Arc::new(ScriptedBackend::replying("ok", Vec::new()))).await;
        let first = service.active_session_id().to_string();

        service.dispatch(ChatIntent::NewSession).await.unwrap();
        assert_ne!(service.active_session_id(), first);
        assert_eq!(service.sessions().len(), 2);

        service
            .dispatch(ChatIntent::SelectSession(first.clone()))
            .await
            .unwrap();
        assert_eq!(service.active_session_id(), first);

        let missing = service
            .dispatch(ChatIntent::SelectSession("no-such-id".to_string()))
            .await
            .unwrap_err();
        assert!(missing.is_not_found());

        service
            .dispatch(ChatIntent::DeleteSession(first))
            .await
            .unwrap();
        assert_eq!(service.sessions().len(), 1);
    }

    #[tokio::test]
    async fn favorite_intent_routes_by_message_id_alone() {
        let mut service = service_with(Arc::new(ScriptedBackend::replying("ok", Vec::new()))).await;
        service.send_message("keep this").await;
        let message_id = service.current_messages()[2].id.clone();

        // Move to another session; the toggle must still find the owner
        service.dispatch(ChatIntent::NewSession).await.unwrap();
        service
            .dispatch(ChatIntent::ToggleFavorite(message_id.clone()))
            .await
            .unwrap();

        let starred = service.favorites();
        assert_eq!(starred.len(), 1);
        assert_eq!(starred[0].id, message_id);

        service
            .dispatch(ChatIntent::ToggleFavorite(message_id))
            .await
            .unwrap();
        assert!(service.favorites().is_empty());
    }

    #[tokio::test]
    async fn grouped_history_sees_every_session() {
        let mut service = service_with(Arc::new(ScriptedBackend::replying("ok", Vec::new()))).await;
        service.dispatch(ChatIntent::NewSession).await.unwrap();
        service.dispatch(ChatIntent::NewSession).await.unwrap();

        let groups = service.grouped_history(Local::now());
        assert_eq!(groups.len(), service.sessions().len());
        // Freshly created sessions were all touched today
        assert_eq!(groups.today.len(), 3);
    }

    #[tokio::test]
    async fn sign_out_wipes_history() {
        let mut service = service_with(Arc::new(ScriptedBackend::replying("ok", Vec::new()))).await;
        service.send_message("remember me").await;
        let old = service.active_session_id().to_string();

        service.sign_out().await;

        assert_eq!(service.sessions().len(), 1);
        assert_ne!(service.active_session_id(), old);
        assert_eq!(service.current_messages().len(), 1);
    }
}
