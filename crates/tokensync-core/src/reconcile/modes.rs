//! Mode reconciliation
//!
//! Four passes over one collection, each only seeing what the previous ones
//! left over:
//!
//! 1. bind modes whose name already matches a plan entry
//! 2. rename leftover modes to unmatched entries, in order
//! 3. add modes for entries still unmatched; refusals skip the entry
//! 4. remove modes nothing bound
//!
//! Renaming before adding keeps mode ids (and every value keyed by them)
//! stable when a brand is renamed.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;
use tokensync_meta::Theme;

use crate::diagnostic::Diagnostics;
use crate::naming::{mode_key, mode_name};
use crate::store::{Collection, Mode, ModeId, VariableStore};

/// A mode the payload needs in every multi-mode collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModePlan {
    /// Stable key, `"<brand>-<theme>"`
    pub key: String,
    /// Display name, `"<Brand> <Theme>"`
    pub name: String,
    pub brand: String,
    pub theme: Theme,
}

impl ModePlan {
    pub fn new(brand: &str, theme: Theme) -> Self {
        Self {
            key: mode_key(brand, theme),
            name: mode_name(brand, theme),
            brand: brand.to_string(),
            theme,
        }
    }
}

/// Brands × themes, brand-major.
pub fn plan_modes<S: AsRef<str>>(brands: &[S], themes: &[Theme]) -> Vec<ModePlan> {
    brands
        .iter()
        .flat_map(|brand| themes.iter().map(move |theme| ModePlan::new(brand.as_ref(), *theme)))
        .collect()
}

/// Outcome of reconciling one collection's modes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeBinding {
    /// Plan key to the mode now carrying it
    pub bound: BTreeMap<String, ModeId>,
    /// `(old name, new name)` for every reused mode
    pub renamed: Vec<(String, String)>,
    /// Keys of modes that had to be added
    pub created: Vec<String>,
    /// Names of modes removed in cleanup
    pub removed: Vec<String>,
    /// Keys the store refused to add
    pub skipped: Vec<String>,
}

impl ModeBinding {
    pub fn mode(&self, key: &str) -> Option<&ModeId> {
        self.bound.get(key)
    }
}

/// Fit `collection`'s modes to `plans`.
///
/// Never fails as a whole: refused renames fall through to creation,
/// refused creations are recorded in [`ModeBinding::skipped`] with a
/// diagnostic, and modes that cannot be removed (typically the last one)
/// are left in place.
pub async fn reconcile_modes(
    store: &dyn VariableStore,
    collection: &Collection,
    plans: &[ModePlan],
    diagnostics: &mut Diagnostics,
) -> ModeBinding {
    let mut binding = ModeBinding::default();
    let mut used: BTreeSet<ModeId> = BTreeSet::new();

    // Exact name matches
    let mut unmatched: Vec<&ModePlan> = Vec::new();
    for plan in plans {
        match collection
            .modes
            .iter()
            .find(|m| m.name == plan.name && !used.contains(&m.id))
        {
            Some(mode) => {
                used.insert(mode.id.clone());
                binding.bound.insert(plan.key.clone(), mode.id.clone());
            }
            None => unmatched.push(plan),
        }
    }

    // Reuse leftovers by renaming
    let mut leftovers: VecDeque<&Mode> = collection
        .modes
        .iter()
        .filter(|m| !used.contains(&m.id))
        .collect();
    let mut to_create: Vec<&ModePlan> = Vec::new();
    for plan in unmatched {
        let Some(mode) = leftovers.pop_front() else {
            to_create.push(plan);
            continue;
        };
        match store.rename_mode(&collection.id, &mode.id, &plan.name).await {
            Ok(()) => {
                tracing::debug!(
                    collection = %collection.name,
                    from = %mode.name,
                    to = %plan.name,
                    "Renamed mode"
                );
                used.insert(mode.id.clone());
                binding.bound.insert(plan.key.clone(), mode.id.clone());
                binding.renamed.push((mode.name.clone(), plan.name.clone()));
            }
            Err(e) => {
                tracing::debug!(collection = %collection.name, mode = %mode.name, error = %e, "Rename refused");
                to_create.push(plan);
            }
        }
    }

    // Create what is still missing
    for plan in to_create {
        match store.add_mode(&collection.id, &plan.name).await {
            Ok(id) => {
                tracing::debug!(collection = %collection.name, mode = %plan.name, "Added mode");
                binding.bound.insert(plan.key.clone(), id);
                binding.created.push(plan.key.clone());
            }
            Err(e) => {
                diagnostics.push(
                    &plan.key,
                    format!("could not add mode {:?} to {}: {e}", plan.name, collection.name),
                );
                binding.skipped.push(plan.key.clone());
            }
        }
    }

    // Drop modes nothing bound, newest first
    for mode in collection.modes.iter().rev().filter(|m| !used.contains(&m.id)) {
        match store.remove_mode(&collection.id, &mode.id).await {
            Ok(()) => {
                tracing::debug!(collection = %collection.name, mode = %mode.name, "Removed mode");
                binding.removed.push(mode.name.clone());
            }
            Err(e) => {
                tracing::debug!(
                    collection = %collection.name,
                    mode = %mode.name,
                    error = %e,
                    "Could not remove unused mode"
                );
            }
        }
    }

    binding
}
