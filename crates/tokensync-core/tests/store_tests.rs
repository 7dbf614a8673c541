//! Tests for running the SyncEngine against persistent and slow stores

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::Notify;
use tokensync_core::{
    Collection, CollectionId, Error, FileStore, MemoryStore, ModeId, NullProgress, StoreDocument,
    StoreError, SyncConfig, SyncEngine, Variable, VariableId, VariableStore, VariableValue,
};
use tokensync_meta::{Payload, TokenType};
use tokensync_test_utils::fixtures::{scenario_payload, two_brand_graph};

// ============================================================================
// FileStore
// ============================================================================

#[tokio::test]
async fn test_file_store_persists_a_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".tokensync").join("store.json");
    let payload = scenario_payload();

    {
        let store = Arc::new(FileStore::open(&path).unwrap());
        let report = SyncEngine::new(store, SyncConfig::default())
            .sync(&payload, &NullProgress)
            .await
            .unwrap();
        assert!(report.success);
    }

    let document = StoreDocument::read(&path).unwrap();
    assert_eq!(
        document.last_payload_fingerprint,
        Some(payload.fingerprint())
    );
    assert!(document.last_synced_at.is_some());
    assert!(
        document
            .state
            .variable_named("Components", "button/filled-text")
            .is_some()
    );
    assert!(document.state.dangling_aliases().is_empty());
}

#[tokio::test]
async fn test_reopened_file_store_syncs_without_structural_changes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let graph = two_brand_graph();

    {
        let store = Arc::new(FileStore::open(&path).unwrap());
        SyncEngine::new(store, SyncConfig::default())
            .sync_graph(&graph, &NullProgress)
            .await
            .unwrap();
    }

    let store = Arc::new(FileStore::open(&path).unwrap());
    let report = SyncEngine::new(store.clone(), SyncConfig::default())
        .sync_graph(&graph, &NullProgress)
        .await
        .unwrap();

    assert!(report.is_structurally_unchanged());
    assert_eq!(store.memory().stats().structural_changes(), 0);
}

#[tokio::test]
async fn test_reopened_file_store_reads_back_the_written_state() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let written = {
        let store = Arc::new(FileStore::open(&path).unwrap());
        SyncEngine::new(store.clone(), SyncConfig::default())
            .sync_graph(&two_brand_graph(), &NullProgress)
            .await
            .unwrap();
        store.memory().snapshot()
    };

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.memory().snapshot(), written);
    assert_eq!(StoreDocument::read(&path).unwrap().state, written);
}

#[tokio::test]
async fn test_payload_error_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let store = Arc::new(FileStore::open(&path).unwrap());
    let err = SyncEngine::new(store, SyncConfig::default())
        .sync(&Payload::default(), &NullProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NoBrands));
    assert!(!path.exists());
}

#[tokio::test]
async fn test_failed_run_keeps_previous_fingerprint() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let payload = scenario_payload();

    let store = Arc::new(FileStore::open(&path).unwrap());
    SyncEngine::new(store.clone(), SyncConfig::default())
        .sync(&payload, &NullProgress)
        .await
        .unwrap();

    let no_themes = SyncConfig {
        themes: Vec::new(),
        ..SyncConfig::default()
    };
    let err = SyncEngine::new(store, no_themes)
        .sync(&payload, &NullProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NoModes));

    // the partial run is still written, but not marked as synced
    let document = StoreDocument::read(&path).unwrap();
    assert_eq!(
        document.last_payload_fingerprint,
        Some(payload.fingerprint())
    );
}

#[test]
fn test_second_open_is_locked_out() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let _first = FileStore::open(&path).unwrap();
    let second = FileStore::open(&path);
    assert!(matches!(second, Err(StoreError::Lock { .. })));
}

// ============================================================================
// Run guard
// ============================================================================

/// Store that parks the first listing of collections until released.
#[derive(Default)]
struct GatedStore {
    inner: MemoryStore,
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl VariableStore for GatedStore {
    async fn collections(&self) -> Result<Vec<Collection>, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
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
}

#[tokio::test]
async fn test_try_sync_refuses_while_a_run_is_in_flight() {
    let store = Arc::new(GatedStore::default());
    let engine = Arc::new(SyncEngine::new(store.clone(), SyncConfig::default()));

    let running = tokio::spawn({
        let engine = engine.clone();
        async move { engine.sync(&scenario_payload(), &NullProgress).await }
    });
    store.entered.notified().await;

    let err = engine
        .try_sync(&scenario_payload(), &NullProgress)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::SyncInProgress));

    store.release.notify_one();
    let report = running.await.unwrap().unwrap();
    assert!(report.success);

    // the guard is free again
    store.release.notify_one();
    let report = engine
        .try_sync(&scenario_payload(), &NullProgress)
        .await
        .unwrap();
    assert!(report.is_structurally_unchanged());
}
