//! Snapshot repository trait.
//!
//! Defines the interface for persisting the full session collection.

use super::model::ChatSession;
use anyhow::Result;
use async_trait::async_trait;

/// An abstract store for the session snapshot.
///
/// The whole session collection is the unit of persistence: it is loaded
/// once at startup and rewritten in full after qualifying mutations.
/// This decouples the in-memory store from the concrete storage
/// mechanism (JSON file, database, remote API).
///
/// # Implementation Notes
///
/// - `load` must fail soft: missing, empty or corrupt data is reported
///   as `Ok(None)`, never as an error the caller has to distinguish
///   from "no prior state".
/// - `save` must be atomic with respect to partial writes: either the
///   whole snapshot persists or the previous snapshot remains intact.
///   Cross-process locking is not required; the store is single-writer.
#[async_trait]
pub trait SnapshotRepository: Send + Sync {
    /// Loads the persisted session collection.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(sessions))`: A prior snapshot was found and parsed
    /// - `Ok(None)`: No usable prior state (missing, empty or corrupt)
    /// - `Err(_)`: Unexpected storage failure
    async fn load(&self) -> Result<Option<Vec<ChatSession>>>;

    /// Persists the full session collection, replacing any prior snapshot.
    async fn save(&self, sessions: &[ChatSession]) -> Result<()>;

    /// Removes the persisted snapshot entirely (used on sign-out).
    async fn clear(&self) -> Result<()>;
}
