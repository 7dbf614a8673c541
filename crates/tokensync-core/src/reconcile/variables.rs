//! Variable reconciliation, one phase at a time
//!
//! Phases must run in dependency order: primitives, then semantic tokens
//! (which alias primitives), then component literals (which alias semantic
//! tokens), then component pointers (which alias component literals). A
//! phase only ever aliases variables an earlier phase has already written.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tokensync_meta::{ComponentEntry, Palettes, Payload, Rgba, Theme, TokenType, TokenValue};

use super::modes::{ModeBinding, ModePlan};
use crate::diagnostic::Diagnostics;
use crate::store::{
    Collection, CollectionId, ModeId, NameIndex, StoreError, Variable, VariableId, VariableStore,
    VariableValue,
};

/// Tally of store mutations made by a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub created: usize,
    pub updated: usize,
    pub aliased: usize,
    pub deleted: usize,
    pub collections_created: usize,
    pub collections_removed: usize,
}

/// What the semantic phase leaves for the component phase.
#[derive(Debug, Default)]
pub struct SemanticOutcome {
    pub variables: NameIndex<Variable>,
    /// `(semantic key, mode key)` pairs written as aliases this run
    pub aliased: BTreeSet<(String, String)>,
}

/// Applies a payload to a store's variables.
pub struct VariableReconciler<'a> {
    store: &'a dyn VariableStore,
    payload: &'a Payload,
    missing_color: Rgba,
    pub counters: Counters,
    pub diagnostics: Diagnostics,
    pub actions: Vec<String>,
}

impl<'a> VariableReconciler<'a> {
    pub fn new(
        store: &'a dyn VariableStore,
        payload: &'a Payload,
        missing_color: &str,
    ) -> Self {
        Self {
            store,
            payload,
            missing_color: Rgba::parse(missing_color).unwrap_or(Rgba::TRANSPARENT),
            counters: Counters::default(),
            diagnostics: Diagnostics::new(),
            actions: Vec::new(),
        }
    }

    /// Find a collection by name, creating it when absent.
    pub async fn ensure_collection(
        &mut self,
        index: &mut NameIndex<Collection>,
        name: &str,
    ) -> Result<Collection, StoreError> {
        if let Some(existing) = index.get(name) {
            return Ok(existing.clone());
        }
        let created = self.store.create_collection(name).await?;
        tracing::debug!(collection = %name, "Created collection");
        self.counters.collections_created += 1;
        self.actions.push(format!("Created collection {name}"));
        index.insert(created.clone());
        Ok(created)
    }

    /// Remove collections left over from older store layouts.
    pub async fn remove_legacy_collections(
        &mut self,
        index: &mut NameIndex<Collection>,
        names: &[String],
    ) {
        for name in names {
            let Some(collection) = index.remove(name) else {
                continue;
            };
            match self.store.remove_collection(&collection.id).await {
                Ok(()) => {
                    tracing::info!(collection = %name, "Removed legacy collection");
                    self.counters.collections_removed += 1;
                    self.actions.push(format!("Removed legacy collection {name}"));
                }
                Err(e) => self
                    .diagnostics
                    .push(name, format!("could not remove legacy collection: {e}")),
            }
        }
    }

    /// Sync a palette set into a single-mode collection.
    ///
    /// Variables are named `palette/index`. Existing variables are
    /// overwritten in place, missing ones created and variables no palette
    /// produces any more are deleted.
    pub async fn sync_primitives(
        &mut self,
        collection: &Collection,
        palettes: &Palettes,
    ) -> NameIndex<Variable> {
        let mut index = self.load_variables(&collection.id, &collection.name).await;
        let Some(mode) = collection.default_mode().map(|m| m.id.clone()) else {
            self.diagnostics
                .push(&collection.name, "collection has no mode to write to");
            return index;
        };

        let mut expected = BTreeSet::new();
        for (palette, colors) in palettes {
            for (position, hex) in colors.iter().enumerate() {
                let name = format!("{palette}/{position}");
                expected.insert(name.clone());

                let color = match Rgba::parse(hex) {
                    Ok(color) => color,
                    Err(e) => {
                        self.diagnostics
                            .push(format!("{}/{name}", collection.name), e.to_string());
                        continue;
                    }
                };
                let Some(variable) = self
                    .ensure_variable(collection, &mut index, &name, TokenType::Color)
                    .await
                else {
                    continue;
                };
                self.write(&variable, &mode, "", VariableValue::Color(color))
                    .await;
            }
        }

        self.remove_stale(&mut index, &expected).await;
        index
    }

    /// Sync semantic tokens across `modes`, the modes bound in every
    /// multi-mode collection.
    ///
    /// Each mode aliases the primitive named by its brand's entry, looked up
    /// first in the brand's own primitives and then in the global ones. When
    /// neither has it, the entry's resolved hex is written as a literal.
    pub async fn sync_semantic(
        &mut self,
        collection: &Collection,
        binding: &ModeBinding,
        modes: &[ModePlan],
        reference_brand: &str,
        brand_primitives: &BTreeMap<String, NameIndex<Variable>>,
        global_primitives: &NameIndex<Variable>,
    ) -> SemanticOutcome {
        let mut outcome = SemanticOutcome {
            variables: self.load_variables(&collection.id, &collection.name).await,
            aliased: BTreeSet::new(),
        };

        for key in self.semantic_keys(reference_brand) {
            let Some(variable) = self
                .ensure_variable(collection, &mut outcome.variables, &key, TokenType::Color)
                .await
            else {
                continue;
            };

            for plan in modes {
                let Some(entry) = self
                    .payload
                    .brands
                    .get(&plan.brand)
                    .and_then(|b| b.semantic.get(plan.theme).get(&key))
                else {
                    continue;
                };
                let Some(mode) = binding.mode(&plan.key) else {
                    continue;
                };

                let target = brand_primitives
                    .get(&plan.brand)
                    .and_then(|vars| vars.get(&entry.alias))
                    .or_else(|| global_primitives.get(&entry.alias));

                let written = match target {
                    Some(primitive) => {
                        self.write(&variable, mode, &plan.key, VariableValue::Alias(primitive.id.clone()))
                            .await
                    }
                    None => {
                        self.diagnostics.push(
                            &key,
                            format!(
                                "primitive {} not found for {}, using raw value",
                                entry.alias, plan.key
                            ),
                        );
                        let color = self.color_or_missing(&key, entry.value.as_deref());
                        self.write(&variable, mode, &plan.key, VariableValue::Color(color))
                            .await;
                        false
                    }
                };
                if written {
                    outcome.aliased.insert((key.clone(), plan.key.clone()));
                }
            }
        }

        outcome
    }

    /// Reference brand's light keys, then keys only its dark theme has.
    fn semantic_keys(&self, reference_brand: &str) -> Vec<String> {
        let Some(brand) = self.payload.brands.get(reference_brand) else {
            return Vec::new();
        };
        let mut keys: Vec<String> = brand.semantic.light.keys().cloned().collect();
        keys.extend(
            brand
                .semantic
                .dark
                .keys()
                .filter(|k| !brand.semantic.light.contains_key(*k))
                .cloned(),
        );
        keys
    }

    /// Sync component tokens in two passes: leaf values first, then the
    /// pointer entries (`aliasOf`) that alias those leaves.
    ///
    /// The reference brand's token set decides which variables exist; other
    /// brands only contribute values for their own modes.
    pub async fn sync_components(
        &mut self,
        collection: &Collection,
        binding: &ModeBinding,
        modes: &[ModePlan],
        reference_brand: &str,
        semantic: &SemanticOutcome,
    ) -> NameIndex<Variable> {
        let mut index = self.load_variables(&collection.id, &collection.name).await;
        let Some(reference) = self.payload.brands.get(reference_brand) else {
            return index;
        };
        let (pointers, leaves): (Vec<_>, Vec<_>) = reference
            .components
            .iter()
            .partition(|(_, entry)| entry.alias_of.is_some());

        for (path, entry) in leaves {
            let Some(variable) = self
                .ensure_variable(collection, &mut index, path, entry.kind)
                .await
            else {
                continue;
            };
            for plan in modes {
                let Some(token) = self.brand_token(plan, path, entry.kind) else {
                    continue;
                };
                let Some(mode) = binding.mode(&plan.key) else {
                    continue;
                };
                let value = self.leaf_value(path, plan, token, semantic);
                self.write(&variable, mode, &plan.key, value).await;
            }
        }

        for (path, entry) in pointers {
            let Some(variable) = self
                .ensure_variable(collection, &mut index, path, entry.kind)
                .await
            else {
                continue;
            };
            for plan in modes {
                let Some(token) = self.brand_token(plan, path, entry.kind) else {
                    continue;
                };
                let Some(mode) = binding.mode(&plan.key) else {
                    continue;
                };
                let target = token
                    .alias_of
                    .as_deref()
                    .and_then(|target| index.get(target))
                    .map(|v| v.id.clone());
                let value = match target {
                    Some(id) => VariableValue::Alias(id),
                    None => {
                        if let Some(missing) = &token.alias_of {
                            self.diagnostics.push(
                                path,
                                format!("alias target {missing} not found for {}, using raw value", plan.key),
                            );
                        }
                        self.literal(path, token.kind, token.value.as_ref())
                    }
                };
                self.write(&variable, mode, &plan.key, value).await;
            }
        }

        index
    }

    /// Delete component variables no synced brand produces.
    pub async fn prune_components(&mut self, index: &mut NameIndex<Variable>, brands: &[String]) {
        let expected: BTreeSet<String> = brands
            .iter()
            .filter_map(|b| self.payload.brands.get(b))
            .flat_map(|b| b.components.keys().cloned())
            .collect();
        self.remove_stale(index, &expected).await;
    }

    fn brand_token(&mut self, plan: &ModePlan, path: &str, kind: TokenType) -> Option<&'a ComponentEntry> {
        let token = self.payload.brands.get(&plan.brand)?.components.get(path)?;
        if token.kind != kind {
            self.diagnostics.push(
                path,
                format!("{} declares {} but the variable is {kind}", plan.brand, token.kind),
            );
            return None;
        }
        Some(token)
    }

    fn leaf_value(
        &mut self,
        path: &str,
        plan: &ModePlan,
        token: &ComponentEntry,
        semantic: &SemanticOutcome,
    ) -> VariableValue {
        if token.kind != TokenType::Color {
            return self.literal(path, token.kind, token.value.as_ref());
        }

        if let Some(key) = &token.alias
            && semantic.aliased.contains(&(key.clone(), plan.key.clone()))
            && let Some(target) = semantic.variables.get(key)
        {
            return VariableValue::Alias(target.id.clone());
        }

        // Fallback chain: own value, then the semantic entry's raw value,
        // then the missing color. Tokens without a semantic key stay clear.
        if let Some(value) = &token.value {
            return VariableValue::Color(self.parse_color(path, &value.to_string()));
        }
        match &token.alias {
            Some(key) => {
                let raw = self.semantic_value(&plan.brand, plan.theme, key);
                VariableValue::Color(self.color_or_missing(path, raw.as_deref()))
            }
            None => VariableValue::Color(Rgba::TRANSPARENT),
        }
    }

    fn semantic_value(&self, brand: &str, theme: Theme, key: &str) -> Option<String> {
        self.payload
            .brands
            .get(brand)?
            .semantic
            .get(theme)
            .get(key)?
            .value
            .clone()
    }

    fn literal(&mut self, path: &str, kind: TokenType, value: Option<&TokenValue>) -> VariableValue {
        match kind {
            TokenType::Color => VariableValue::Color(match value {
                Some(v) => self.parse_color(path, &v.to_string()),
                None => Rgba::TRANSPARENT,
            }),
            TokenType::Float => {
                let number = value.and_then(TokenValue::as_f64);
                if number.is_none()
                    && let Some(v) = value
                {
                    self.diagnostics
                        .push(path, format!("{v:?} is not a number, writing 0"));
                }
                VariableValue::Float(number.unwrap_or(0.0))
            }
            TokenType::String => {
                VariableValue::String(value.map(ToString::to_string).unwrap_or_default())
            }
        }
    }

    fn parse_color(&mut self, path: &str, hex: &str) -> Rgba {
        Rgba::parse(hex).unwrap_or_else(|e| {
            self.diagnostics.push(path, e.to_string());
            Rgba::TRANSPARENT
        })
    }

    fn color_or_missing(&mut self, path: &str, hex: Option<&str>) -> Rgba {
        match hex {
            Some(hex) => self.parse_color(path, hex),
            None => self.missing_color,
        }
    }

    async fn load_variables(&mut self, collection: &CollectionId, name: &str) -> NameIndex<Variable> {
        match self.store.variables(collection).await {
            Ok(variables) => NameIndex::build(variables),
            Err(e) => {
                self.diagnostics
                    .push(name, format!("could not list variables: {e}"));
                NameIndex::default()
            }
        }
    }

    /// Existing variable by name, or a newly created one.
    ///
    /// A variable whose type no longer matches is replaced, since stores
    /// cannot change a variable's type in place.
    async fn ensure_variable(
        &mut self,
        collection: &Collection,
        index: &mut NameIndex<Variable>,
        name: &str,
        kind: TokenType,
    ) -> Option<Variable> {
        if let Some(existing) = index.get(name) {
            if existing.kind == kind {
                return Some(existing.clone());
            }
            self.diagnostics.push(
                name,
                format!("type changed from {} to {kind}, recreating", existing.kind),
            );
            let id = existing.id.clone();
            if let Err(e) = self.store.remove_variable(&id).await {
                self.diagnostics
                    .push(name, format!("could not remove variable: {e}"));
                return None;
            }
            index.remove(name);
            self.counters.deleted += 1;
        }

        match self.store.create_variable(&collection.id, name, kind).await {
            Ok(variable) => {
                tracing::debug!(collection = %collection.name, variable = %name, "Created variable");
                self.counters.created += 1;
                index.insert(variable.clone());
                Some(variable)
            }
            Err(e) => {
                self.diagnostics
                    .push(name, format!("could not create variable: {e}"));
                None
            }
        }
    }

    /// Write one value; failures become diagnostics. Returns whether the
    /// write landed.
    async fn write(
        &mut self,
        variable: &Variable,
        mode: &ModeId,
        mode_key: &str,
        value: VariableValue,
    ) -> bool {
        let is_alias = matches!(value, VariableValue::Alias(_));
        match self.store.set_value(&variable.id, mode, value).await {
            Ok(()) => {
                if is_alias {
                    self.counters.aliased += 1;
                } else {
                    self.counters.updated += 1;
                }
                true
            }
            Err(e) => {
                let message = if mode_key.is_empty() {
                    format!("write failed: {e}")
                } else {
                    format!("write failed for {mode_key}: {e}")
                };
                self.diagnostics.push(&variable.name, message);
                false
            }
        }
    }

    async fn remove_stale(&mut self, index: &mut NameIndex<Variable>, expected: &BTreeSet<String>) {
        let stale: Vec<(String, VariableId)> = index
            .stale(expected)
            .map(|v| (v.name.clone(), v.id.clone()))
            .collect();
        for (name, id) in stale {
            match self.store.remove_variable(&id).await {
                Ok(()) => {
                    tracing::debug!(variable = %name, "Removed stale variable");
                    index.remove(&name);
                    self.counters.deleted += 1;
                }
                Err(e) => self
                    .diagnostics
                    .push(&name, format!("could not remove stale variable: {e}")),
            }
        }
    }
}
