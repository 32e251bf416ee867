//! Chat session domain module.
//!
//! Contains the session and message models, the session store that
//! enforces the collection invariants, and the pure read views
//! (recency grouping, favorites aggregation) the UI consumes.
//!
//! # Module Structure
//!
//! - `message`: Chat message types (`MessageRole`, `ChatMessage`)
//! - `model`: Session domain model (`ChatSession`)
//! - `store`: Authoritative in-memory session collection (`SessionStore`)
//! - `repository`: Persistence trait for the session snapshot
//! - `backend`: Trait for the generative scholar backend
//! - `grouping`: Recency bucketing of sessions for history display
//! - `favorites`: Aggregation of favorite-marked messages

mod backend;
mod favorites;
mod grouping;
mod message;
mod model;
mod repository;
mod store;

pub use backend::{ScholarBackend, ScholarReply};
pub use favorites::favorites;
pub use grouping::{GroupedSessions, RecencyBucket, group_by_recency};
pub use message::{ChatMessage, MessageRole};
pub use model::{ChatSession, DEFAULT_TITLE, TITLE_MAX_CHARS, WELCOME_TEXT};
pub use repository::SnapshotRepository;
pub use store::SessionStore;
