//! JSON-file backed variable store
//!
//! Holds the store in memory for the duration of a run and writes it back
//! on [`commit`](VariableStore::commit). The file is replaced atomically
//! (write to a temp file in the same directory, then rename), and an
//! exclusive advisory lock on a sibling `.lock` file keeps two processes
//! from syncing into the same store at once.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokensync_meta::TokenType;

use super::{
    Collection, CollectionId, CommitInfo, MemoryStore, ModeId, StoreError, StoreState, Variable,
    VariableId, VariableStore, VariableValue,
};

const DOCUMENT_VERSION: &str = "1";

/// On-disk layout of a file store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub version: String,
    /// Fingerprint of the last payload synced without a fatal error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_payload_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub state: StoreState,
}

impl Default for StoreDocument {
    fn default() -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            last_payload_fingerprint: None,
            last_synced_at: None,
            state: StoreState::default(),
        }
    }
}

impl StoreDocument {
    /// Read a store file without locking it. A missing file reads as empty.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        serde_json::from_str(&content).map_err(|e| StoreError::Serialize {
            message: format!("{}: {e}", path.display()),
        })
    }
}

/// Variable store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    meta: Mutex<StoreDocument>,
    // Held for the lifetime of the store; the lock is released on drop.
    _lock: File,
}

impl FileStore {
    /// Open (or start) the store at `path`, taking the process lock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let lock_path = sibling(&path, "lock");
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| io_error(&lock_path, e))?;
        lock.try_lock_exclusive().map_err(|e| StoreError::Lock {
            message: format!("{}: {e}", lock_path.display()),
        })?;

        let mut document = StoreDocument::read(&path)?;
        let state = std::mem::take(&mut document.state);
        tracing::debug!(
            path = %path.display(),
            collections = state.collections.len(),
            variables = state.variables.len(),
            "Opened file store"
        );

        Ok(Self {
            path,
            inner: MemoryStore::from_state(state),
            meta: Mutex::new(document),
            _lock: lock,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The in-memory view, including its call counters.
    pub fn memory(&self) -> &MemoryStore {
        &self.inner
    }

    /// Current contents plus metadata, as they would be written.
    pub fn document(&self) -> StoreDocument {
        let meta = self
            .meta
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        StoreDocument {
            version: meta.version.clone(),
            last_payload_fingerprint: meta.last_payload_fingerprint.clone(),
            last_synced_at: meta.last_synced_at,
            state: self.inner.snapshot(),
        }
    }

    fn write(&self, document: &StoreDocument) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(document).map_err(|e| StoreError::Serialize {
            message: e.to_string(),
        })?;

        let temp_path = sibling(&self.path, &format!("{}.tmp", std::process::id()));
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| io_error(&temp_path, e))?;
        temp_file
            .write_all(&content)
            .map_err(|e| io_error(&temp_path, e))?;
        temp_file.sync_all().map_err(|e| io_error(&temp_path, e))?;
        drop(temp_file);

        fs::rename(&temp_path, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "store.json".to_string());
    path.with_file_name(format!("{name}.{suffix}"))
}

fn io_error(path: &Path, error: std::io::Error) -> StoreError {
    StoreError::Io {
        message: format!("{}: {error}", path.display()),
    }
}

#[async_trait]
impl VariableStore for FileStore {
    async fn collections(&self) -> Result<Vec<Collection>, StoreError> {
        self.inner.collections().await
    }

    async fn create_collection(&self, name: &str) -> Result<Collection, StoreError> {
        self.inner.create_collection(name).await
    }

    async fn remove_collection(&self, id: &CollectionId) -> Result<(), StoreError> {
        self.inner.remove_collection(id).await
    }

    async fn add_mode(&self, collection: &CollectionId, name: &str) -> Result<ModeId, StoreError> {
        self.inner.add_mode(collection, name).await
    }

    async fn rename_mode(
        &self,
        collection: &CollectionId,
        mode: &ModeId,
        name: &str,
    ) -> Result<(), StoreError> {
        self.inner.rename_mode(collection, mode, name).await
    }

    async fn remove_mode(
        &self,
        collection: &CollectionId,
        mode: &ModeId,
    ) -> Result<(), StoreError> {
        self.inner.remove_mode(collection, mode).await
    }

    async fn variables(&self, collection: &CollectionId) -> Result<Vec<Variable>, StoreError> {
        self.inner.variables(collection).await
    }

    async fn create_variable(
        &self,
        collection: &CollectionId,
        name: &str,
        kind: TokenType,
    ) -> Result<Variable, StoreError> {
        self.inner.create_variable(collection, name, kind).await
    }

    async fn set_value(
        &self,
        variable: &VariableId,
        mode: &ModeId,
        value: VariableValue,
    ) -> Result<(), StoreError> {
        self.inner.set_value(variable, mode, value).await
    }

    async fn remove_variable(&self, id: &VariableId) -> Result<(), StoreError> {
        self.inner.remove_variable(id).await
    }

    async fn commit(&self, info: &CommitInfo) -> Result<(), StoreError> {
        let document = {
            let mut meta = self
                .meta
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if let Some(fingerprint) = &info.payload_fingerprint {
                meta.last_payload_fingerprint = Some(fingerprint.clone());
                meta.last_synced_at = Some(Utc::now());
            }
            StoreDocument {
                version: meta.version.clone(),
                last_payload_fingerprint: meta.last_payload_fingerprint.clone(),
                last_synced_at: meta.last_synced_at,
                state: self.inner.snapshot(),
            }
        };

        self.write(&document)?;
        tracing::debug!(path = %self.path.display(), "Committed file store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn commit_persists_state_and_metadata() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".tokensync").join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.create_collection("Semantic").await.unwrap();
            store
                .commit(&CommitInfo {
                    payload_fingerprint: Some("abc".into()),
                })
                .await
                .unwrap();
        }

        let document = StoreDocument::read(&path).unwrap();
        assert_eq!(document.version, "1");
        assert_eq!(document.last_payload_fingerprint.as_deref(), Some("abc"));
        assert!(document.last_synced_at.is_some());
        assert!(document.state.collection_named("Semantic").is_some());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.collections().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn uncommitted_changes_are_not_written() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.create_collection("Semantic").await.unwrap();
        }

        assert!(!path.exists());
        assert!(StoreDocument::read(&path).unwrap().state.collections.is_empty());
    }

    #[test]
    fn second_open_is_locked_out() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.json");

        let _first = FileStore::open(&path).unwrap();
        let second = FileStore::open(&path);
        assert!(matches!(second, Err(StoreError::Lock { .. })));
    }
}
