//! JSON-file implementation of the snapshot repository.

use crate::storage::AtomicJsonFile;
use alim_core::chat::{ChatSession, SnapshotRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SNAPSHOT_FILE: &str = "chat_sessions.json";
const SNAPSHOT_VERSION: u32 = 1;

/// On-disk envelope around the session collection.
///
/// The version tag leaves room for schema evolution: an envelope with
/// an unknown version loads soft as "no prior state" instead of
/// crashing the application on a downgrade.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    sessions: Vec<ChatSession>,
}

/// Stores the full session collection as one JSON file.
///
/// The whole snapshot is rewritten atomically on every save; `load`
/// fails soft so a missing or corrupt file degrades to a fresh start
/// rather than an error the user would see.
pub struct JsonSnapshotRepository {
    file: AtomicJsonFile<SnapshotEnvelope>,
}

impl JsonSnapshotRepository {
    /// Creates a repository storing its snapshot under `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        std::fs::create_dir_all(base_dir)
            .with_context(|| format!("Failed to create storage directory: {:?}", base_dir))?;

        Ok(Self {
            file: AtomicJsonFile::new(base_dir.join(SNAPSHOT_FILE)),
        })
    }

    /// Creates a repository at the default location (`~/.alim`).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or
    /// the directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get home directory")?;
        Self::new(home_dir.join(".alim"))
    }
}

#[async_trait]
impl SnapshotRepository for JsonSnapshotRepository {
    async fn load(&self) -> Result<Option<Vec<ChatSession>>> {
        let envelope = match self.file.load() {
            Ok(Some(envelope)) => envelope,
            Ok(None) => return Ok(None),
            Err(e) => {
                // Corrupt data is indistinguishable from no prior state
                // for the caller; it must not block startup.
                tracing::warn!(error = %e, "unreadable session snapshot, treating as empty");
                return Ok(None);
            }
        };

        if envelope.version != SNAPSHOT_VERSION {
            tracing::warn!(
                version = envelope.version,
                "unsupported snapshot version, treating as empty"
            );
            return Ok(None);
        }

        Ok(Some(envelope.sessions))
    }

    async fn save(&self, sessions: &[ChatSession]) -> Result<()> {
        let envelope = SnapshotEnvelope {
            version: SNAPSHOT_VERSION,
            sessions: sessions.to_vec(),
        };
        self.file
            .save(&envelope)
            .context("Failed to write session snapshot")
    }

    async fn clear(&self) -> Result<()> {
        self.file
            .remove()
            .context("Failed to remove session snapshot")
    }
}
