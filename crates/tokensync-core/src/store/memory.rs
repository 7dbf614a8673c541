//! In-memory variable store
//!
//! Enforces the same rules a design tool's variable API does, so the
//! reconciler can be exercised without one. Also the backing state of
//! [`FileStore`](super::FileStore).

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokensync_meta::TokenType;

use super::{
    Collection, CollectionId, Mode, ModeId, StoreError, Variable, VariableId, VariableStore,
    VariableValue,
};

/// Name given to the single mode of a fresh collection.
pub const INITIAL_MODE_NAME: &str = "Mode 1";

/// Serializable contents of a store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub variables: Vec<Variable>,
    /// Next numeric suffix for generated ids
    #[serde(default)]
    pub next_id: u64,
}

impl StoreState {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}:{}", self.next_id)
    }

    fn collection(&self, id: &CollectionId) -> Result<&Collection, StoreError> {
        self.collections
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::CollectionNotFound { id: id.clone() })
    }

    fn collection_mut(&mut self, id: &CollectionId) -> Result<&mut Collection, StoreError> {
        self.collections
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::CollectionNotFound { id: id.clone() })
    }

    fn variable(&self, id: &VariableId) -> Result<&Variable, StoreError> {
        self.variables
            .iter()
            .find(|v| &v.id == id)
            .ok_or_else(|| StoreError::VariableNotFound { id: id.clone() })
    }

    pub fn collection_named(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }

    pub fn variable_named(&self, collection: &str, name: &str) -> Option<&Variable> {
        let collection = self.collection_named(collection)?;
        self.variables
            .iter()
            .find(|v| v.collection == collection.id && v.name == name)
    }

    pub fn variable_by_id(&self, id: &VariableId) -> Option<&Variable> {
        self.variables.iter().find(|v| &v.id == id)
    }

    /// Value of `collection/variable` in the mode named `mode`.
    pub fn value(&self, collection: &str, variable: &str, mode: &str) -> Option<&VariableValue> {
        let mode_id = &self.collection_named(collection)?.mode_named(mode)?.id;
        self.variable_named(collection, variable)?.values.get(mode_id)
    }

    /// Follow aliases from a value to the literal it finally yields.
    ///
    /// Returns `None` on a dangling alias or a cycle. The mode of each hop is
    /// picked by name, since alias targets may live in collections with
    /// different modes; single-mode targets resolve through their only mode.
    pub fn resolve_value(&self, value: &VariableValue, mode_name: &str) -> Option<VariableValue> {
        let mut current = value.clone();
        for _ in 0..=self.variables.len() {
            let VariableValue::Alias(target) = &current else {
                return Some(current);
            };
            let variable = self.variable_by_id(target)?;
            let collection = self.collections.iter().find(|c| c.id == variable.collection)?;
            let mode = collection
                .mode_named(mode_name)
                .or_else(|| collection.default_mode())?;
            current = variable.values.get(&mode.id)?.clone();
        }
        None
    }

    /// Alias values whose target no longer exists, as `(variable, target)`.
    pub fn dangling_aliases(&self) -> Vec<(&Variable, &VariableId)> {
        self.variables
            .iter()
            .flat_map(|v| {
                v.values
                    .values()
                    .filter_map(VariableValue::alias_target)
                    .filter(|target| self.variable_by_id(target).is_none())
                    .map(move |target| (v, target))
            })
            .collect()
    }
}

/// Counters of mutating calls, for asserting on what a run changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub collections_created: usize,
    pub collections_removed: usize,
    pub modes_added: usize,
    pub modes_renamed: usize,
    pub modes_removed: usize,
    pub variables_created: usize,
    pub variables_removed: usize,
    pub values_set: usize,
}

impl StoreStats {
    /// Calls that changed the store's structure rather than its values.
    pub fn structural_changes(&self) -> usize {
        self.collections_created
            + self.collections_removed
            + self.modes_added
            + self.modes_renamed
            + self.modes_removed
            + self.variables_created
            + self.variables_removed
    }
}

/// A call the store should refuse, for exercising failure handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    /// Refuse adding a mode with this name to the named collection
    AddMode { collection: String, mode: String },
    /// Refuse creating a variable with this name
    CreateVariable { name: String },
    /// Refuse every write to the variable with this name
    SetValue { variable: String },
    /// Refuse removing any mode
    RemoveMode,
}

/// Variable store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    stats: Mutex<StoreStats>,
    fail_points: Mutex<Vec<FailPoint>>,
    mode_limit: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: StoreState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Cap the number of modes per collection, as hosts on limited plans do.
    pub fn with_mode_limit(mut self, limit: usize) -> Self {
        self.mode_limit = Some(limit);
        self
    }

    pub fn fail_on(&self, point: FailPoint) {
        lock(&self.fail_points).push(point);
    }

    pub fn clear_fail_points(&self) {
        lock(&self.fail_points).clear();
    }

    /// Copy of the current contents.
    pub fn snapshot(&self) -> StoreState {
        lock(&self.state).clone()
    }

    pub fn stats(&self) -> StoreStats {
        *lock(&self.stats)
    }

    pub fn reset_stats(&self) {
        *lock(&self.stats) = StoreStats::default();
    }

    fn failing(&self, predicate: impl Fn(&FailPoint) -> bool) -> bool {
        lock(&self.fail_points).iter().any(predicate)
    }

    fn record(&self, update: impl FnOnce(&mut StoreStats)) {
        update(&mut lock(&self.stats));
    }

    fn rejected(operation: &str, reason: &str) -> StoreError {
        StoreError::Rejected {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Lock ignoring poisoning; every mutation below leaves the state valid at
/// each await-free step.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl VariableStore for MemoryStore {
    async fn collections(&self) -> Result<Vec<Collection>, StoreError> {
        Ok(lock(&self.state).collections.clone())
    }

    async fn create_collection(&self, name: &str) -> Result<Collection, StoreError> {
        let mut state = lock(&self.state);
        let collection = Collection {
            id: CollectionId(state.allocate("collection")),
            name: name.to_string(),
            modes: vec![Mode {
                id: ModeId(state.allocate("mode")),
                name: INITIAL_MODE_NAME.to_string(),
            }],
        };
        state.collections.push(collection.clone());
        drop(state);

        self.record(|s| s.collections_created += 1);
        Ok(collection)
    }

    async fn remove_collection(&self, id: &CollectionId) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        state.collection(id)?;
        state.collections.retain(|c| &c.id != id);
        state.variables.retain(|v| &v.collection != id);
        drop(state);

        self.record(|s| s.collections_removed += 1);
        Ok(())
    }

    async fn add_mode(&self, collection: &CollectionId, name: &str) -> Result<ModeId, StoreError> {
        let mut state = lock(&self.state);
        let collection_name = state.collection(collection)?.name.clone();
        if self.failing(|p| {
            matches!(p, FailPoint::AddMode { collection: c, mode } if *c == collection_name && mode == name)
        }) {
            return Err(Self::rejected("add_mode", name));
        }

        let mode_count = state.collection(collection)?.modes.len();
        if let Some(limit) = self.mode_limit
            && mode_count >= limit
        {
            return Err(StoreError::ModeLimitReached {
                collection: collection.clone(),
                limit,
            });
        }

        let id = ModeId(state.allocate("mode"));
        state.collection_mut(collection)?.modes.push(Mode {
            id: id.clone(),
            name: name.to_string(),
        });
        drop(state);

        self.record(|s| s.modes_added += 1);
        Ok(id)
    }

    async fn rename_mode(
        &self,
        collection: &CollectionId,
        mode: &ModeId,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        let target = state
            .collection_mut(collection)?
            .modes
            .iter_mut()
            .find(|m| &m.id == mode)
            .ok_or_else(|| StoreError::ModeNotFound {
                collection: collection.clone(),
                mode: mode.clone(),
            })?;
        target.name = name.to_string();
        drop(state);

        self.record(|s| s.modes_renamed += 1);
        Ok(())
    }

    async fn remove_mode(
        &self,
        collection: &CollectionId,
        mode: &ModeId,
    ) -> Result<(), StoreError> {
        if self.failing(|p| *p == FailPoint::RemoveMode) {
            return Err(Self::rejected("remove_mode", mode.as_str()));
        }

        let mut state = lock(&self.state);
        let target = state.collection_mut(collection)?;
        if !target.modes.iter().any(|m| &m.id == mode) {
            return Err(StoreError::ModeNotFound {
                collection: collection.clone(),
                mode: mode.clone(),
            });
        }
        if target.modes.len() == 1 {
            return Err(StoreError::LastMode {
                collection: collection.clone(),
            });
        }
        target.modes.retain(|m| &m.id != mode);
        for variable in state.variables.iter_mut().filter(|v| &v.collection == collection) {
            variable.values.remove(mode);
        }
        drop(state);

        self.record(|s| s.modes_removed += 1);
        Ok(())
    }

    async fn variables(&self, collection: &CollectionId) -> Result<Vec<Variable>, StoreError> {
        let state = lock(&self.state);
        state.collection(collection)?;
        Ok(state
            .variables
            .iter()
            .filter(|v| &v.collection == collection)
            .cloned()
            .collect())
    }

    async fn create_variable(
        &self,
        collection: &CollectionId,
        name: &str,
        kind: TokenType,
    ) -> Result<Variable, StoreError> {
        if self.failing(|p| matches!(p, FailPoint::CreateVariable { name: n } if n == name)) {
            return Err(Self::rejected("create_variable", name));
        }

        let mut state = lock(&self.state);
        state.collection(collection)?;
        if state
            .variables
            .iter()
            .any(|v| &v.collection == collection && v.name == name)
        {
            return Err(StoreError::Duplicate {
                kind: "Variable",
                name: name.to_string(),
                collection: collection.clone(),
            });
        }

        let variable = Variable {
            id: VariableId(state.allocate("variable")),
            name: name.to_string(),
            collection: collection.clone(),
            kind,
            values: BTreeMap::new(),
        };
        state.variables.push(variable.clone());
        drop(state);

        self.record(|s| s.variables_created += 1);
        Ok(variable)
    }

    async fn set_value(
        &self,
        variable: &VariableId,
        mode: &ModeId,
        value: VariableValue,
    ) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        let target = state.variable(variable)?;
        let target_name = target.name.clone();
        if self.failing(|p| matches!(p, FailPoint::SetValue { variable: n } if *n == target_name)) {
            return Err(Self::rejected("set_value", &target_name));
        }

        let expected = target.kind;
        let collection = state.collection(&target.collection)?;
        if !collection.modes.iter().any(|m| &m.id == mode) {
            return Err(StoreError::ModeNotFound {
                collection: collection.id.clone(),
                mode: mode.clone(),
            });
        }

        let actual = match &value {
            VariableValue::Alias(alias) => {
                if alias == variable {
                    return Err(Self::rejected("set_value", "a variable cannot alias itself"));
                }
                let aliased = state
                    .variable_by_id(alias)
                    .ok_or_else(|| StoreError::DanglingAlias {
                        variable: target_name.clone(),
                        target: alias.clone(),
                    })?;
                aliased.kind
            }
            literal => literal.literal_kind().unwrap_or(expected),
        };
        if actual != expected {
            return Err(StoreError::TypeMismatch {
                variable: target_name,
                expected,
                actual,
            });
        }

        if let Some(target) = state.variables.iter_mut().find(|v| &v.id == variable) {
            target.values.insert(mode.clone(), value);
        }
        drop(state);

        self.record(|s| s.values_set += 1);
        Ok(())
    }

    async fn remove_variable(&self, id: &VariableId) -> Result<(), StoreError> {
        let mut state = lock(&self.state);
        state.variable(id)?;
        state.variables.retain(|v| &v.id != id);
        drop(state);

        self.record(|s| s.variables_removed += 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokensync_meta::Rgba;

    #[tokio::test]
    async fn new_collection_has_one_mode() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();

        assert_eq!(collection.modes.len(), 1);
        assert_eq!(collection.modes[0].name, INITIAL_MODE_NAME);
        assert_eq!(store.stats().collections_created, 1);
    }

    #[tokio::test]
    async fn last_mode_cannot_be_removed() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();

        let err = store
            .remove_mode(&collection.id, &collection.modes[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::LastMode { .. }));
    }

    #[tokio::test]
    async fn mode_limit_is_enforced() {
        let store = MemoryStore::new().with_mode_limit(2);
        let collection = store.create_collection("Semantic").await.unwrap();

        store.add_mode(&collection.id, "Second").await.unwrap();
        let err = store.add_mode(&collection.id, "Third").await.unwrap_err();
        assert!(matches!(err, StoreError::ModeLimitReached { limit: 2, .. }));
    }

    #[tokio::test]
    async fn removing_a_mode_drops_its_values() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();
        let dark = store.add_mode(&collection.id, "Dark").await.unwrap();
        let variable = store
            .create_variable(&collection.id, "text", TokenType::Color)
            .await
            .unwrap();
        store
            .set_value(&variable.id, &dark, VariableValue::Color(Rgba::TRANSPARENT))
            .await
            .unwrap();

        store.remove_mode(&collection.id, &dark).await.unwrap();

        let variables = store.variables(&collection.id).await.unwrap();
        assert!(variables[0].values.is_empty());
    }

    #[tokio::test]
    async fn values_are_type_checked() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Components").await.unwrap();
        let mode = collection.modes[0].id.clone();
        let height = store
            .create_variable(&collection.id, "button/height-md", TokenType::Float)
            .await
            .unwrap();
        let text = store
            .create_variable(&collection.id, "button/text", TokenType::Color)
            .await
            .unwrap();

        let err = store
            .set_value(&height.id, &mode, VariableValue::String("42".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));

        let err = store
            .set_value(&height.id, &mode, VariableValue::Alias(text.id.clone()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::TypeMismatch { expected: TokenType::Float, actual: TokenType::Color, .. }
        ));
    }

    #[tokio::test]
    async fn alias_must_exist() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();
        let variable = store
            .create_variable(&collection.id, "text", TokenType::Color)
            .await
            .unwrap();

        let err = store
            .set_value(
                &variable.id,
                &collection.modes[0].id,
                VariableValue::Alias(VariableId::from("variable:404")),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DanglingAlias { .. }));
    }

    #[tokio::test]
    async fn duplicate_variable_names_are_rejected() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();
        store
            .create_variable(&collection.id, "text", TokenType::Color)
            .await
            .unwrap();

        let err = store
            .create_variable(&collection.id, "text", TokenType::Color)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn fail_points_reject_matching_calls() {
        let store = MemoryStore::new();
        let collection = store.create_collection("Semantic").await.unwrap();
        store.fail_on(FailPoint::AddMode {
            collection: "Semantic".into(),
            mode: "Acme Dark".into(),
        });

        assert!(matches!(
            store.add_mode(&collection.id, "Acme Dark").await,
            Err(StoreError::Rejected { .. })
        ));
        assert!(store.add_mode(&collection.id, "Acme Dim").await.is_ok());

        store.clear_fail_points();
        assert!(store.add_mode(&collection.id, "Acme Dark").await.is_ok());
    }

    #[tokio::test]
    async fn resolve_value_follows_alias_chains() {
        let store = MemoryStore::new();
        let primitives = store.create_collection("Primitive/Global").await.unwrap();
        let semantic = store.create_collection("Semantic").await.unwrap();
        store
            .rename_mode(&semantic.id, &semantic.modes[0].id, "Acme Light")
            .await
            .unwrap();

        let gray = store
            .create_variable(&primitives.id, "gray/1", TokenType::Color)
            .await
            .unwrap();
        let black = Rgba::parse("#000000").unwrap();
        store
            .set_value(&gray.id, &primitives.modes[0].id, VariableValue::Color(black))
            .await
            .unwrap();
        let text = store
            .create_variable(&semantic.id, "text", TokenType::Color)
            .await
            .unwrap();
        store
            .set_value(&text.id, &semantic.modes[0].id, VariableValue::Alias(gray.id.clone()))
            .await
            .unwrap();

        let state = store.snapshot();
        let value = state.value("Semantic", "text", "Acme Light").unwrap();
        assert_eq!(
            state.resolve_value(value, "Acme Light"),
            Some(VariableValue::Color(black))
        );
        assert!(state.dangling_aliases().is_empty());

        store.remove_variable(&gray.id).await.unwrap();
        let state = store.snapshot();
        assert_eq!(state.dangling_aliases().len(), 1);
    }
}
