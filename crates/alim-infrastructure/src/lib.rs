//! Infrastructure layer for the Al-Alim scholar chat.
//!
//! Concrete implementations of the traits `alim-core` defines:
//! JSON-file snapshot persistence and the Gemini generative backend.

pub mod gemini_backend;
pub mod json_snapshot_repository;
pub mod storage;

pub use crate::gemini_backend::{GeminiBackend, GeminiConfig};
pub use crate::json_snapshot_repository::JsonSnapshotRepository;
