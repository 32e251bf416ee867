//! Application layer for the Al-Alim scholar chat.
//!
//! Coordinates the domain session store with the persistence and
//! backend adapters to implement the user-facing chat use cases.

pub mod chat_service;

pub use chat_service::{APOLOGY_TEXT, ChatIntent, ChatService};
