//! Domain layer for the Al-Alim scholar chat assistant.
//!
//! This crate owns every chat session, its messages, derived titles,
//! favorite marks and the recency view of the conversation history.
//! Persistence and the generative backend are reached only through the
//! traits defined here (`SnapshotRepository`, `ScholarBackend`), so the
//! storage format and the AI provider stay swappable.

pub mod chat;
pub mod error;

// Re-export common error type
pub use error::AlimError;
