//! SyncEngine implementation
//!
//! A run walks the store through fixed phases:
//!
//! 1. collections: drop legacy ones, find or create the shared ones
//! 2. modes: fit the semantic and component collections to brands × themes
//! 3. primitives: global, then one collection per brand that kept a mode
//! 4. semantic tokens
//! 5. component tokens (leaves, then pointers), optionally pruning
//!
//! Only payload problems and store failures that leave nothing to work
//! with end a run early; everything else lands in the report.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use tokensync_meta::{Payload, TokenGraph};

use super::progress::{Progress, SyncEvent};
use super::report::SyncReport;
use crate::config::SyncConfig;
use crate::diagnostic::Diagnostic;
use crate::naming::display_name;
use crate::reconcile::{ModePlan, VariableReconciler, plan_modes, reconcile_modes};
use crate::resolve::Resolver;
use crate::store::{CommitInfo, NameIndex, VariableStore};
use crate::{Error, Result};

/// Engine for synchronizing resolved payloads into a variable store
pub struct SyncEngine {
    store: Arc<dyn VariableStore>,
    config: SyncConfig,
    /// Held for the whole of a run
    run_guard: Mutex<()>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn VariableStore>, config: SyncConfig) -> Self {
        Self {
            store,
            config,
            run_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn VariableStore> {
        &self.store
    }

    /// Sync a payload, waiting for any run already in flight.
    pub async fn sync(&self, payload: &Payload, progress: &dyn Progress) -> Result<SyncReport> {
        let _guard = self.run_guard.lock().await;
        self.run(payload, Vec::new(), progress).await
    }

    /// Sync a payload, failing with [`Error::SyncInProgress`] instead of
    /// waiting when another run holds the engine.
    pub async fn try_sync(&self, payload: &Payload, progress: &dyn Progress) -> Result<SyncReport> {
        let _guard = self
            .run_guard
            .try_lock()
            .map_err(|_| Error::SyncInProgress)?;
        self.run(payload, Vec::new(), progress).await
    }

    /// Resolve a graph and sync the result. Resolver diagnostics come first
    /// in the report.
    pub async fn sync_graph(
        &self,
        graph: &TokenGraph,
        progress: &dyn Progress,
    ) -> Result<SyncReport> {
        let resolution = Resolver::new(graph)
            .with_missing_color(self.config.missing_color.as_str())
            .resolve();
        let _guard = self.run_guard.lock().await;
        self.run(&resolution.payload, resolution.diagnostics, progress)
            .await
    }

    async fn run(
        &self,
        payload: &Payload,
        prior: Vec<Diagnostic>,
        progress: &dyn Progress,
    ) -> Result<SyncReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("sync", run_id = %run_id);

        async move {
            let outcome = self.reconcile(run_id, payload, prior, progress).await;
            let outcome = match outcome {
                Err(e) if e.is_payload_error() => Err(e),
                outcome => {
                    let info = CommitInfo {
                        payload_fingerprint: outcome.as_ref().ok().map(|_| payload.fingerprint()),
                    };
                    match self.store.commit(&info).await {
                        Ok(()) => outcome,
                        Err(e) => Err(Error::Store(e)),
                    }
                }
            };

            match &outcome {
                Ok(report) => {
                    tracing::info!(
                        created = report.created,
                        updated = report.updated,
                        aliased = report.aliased,
                        deleted = report.deleted,
                        diagnostics = report.diagnostics.len(),
                        "Sync finished"
                    );
                    progress.emit(SyncEvent::Complete {
                        success: true,
                        message: report.summary(),
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Sync failed");
                    progress.emit(SyncEvent::Complete {
                        success: false,
                        message: e.to_string(),
                    });
                }
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn reconcile(
        &self,
        run_id: Uuid,
        payload: &Payload,
        prior: Vec<Diagnostic>,
        progress: &dyn Progress,
    ) -> Result<SyncReport> {
        let brand_ids: Vec<String> = payload.brands.keys().cloned().collect();
        let Some(first) = brand_ids.first() else {
            return Err(Error::NoBrands);
        };
        ensure_component_tokens(payload, first)?;
        ensure_distinct_display_names(&brand_ids)?;

        let mut report = SyncReport::new(run_id, Utc::now());
        report.diagnostics = prior;
        progress.message(&format!("Starting sync for brands: {}", brand_ids.join(", ")));
        tracing::info!(brands = ?brand_ids, "Starting sync");

        let store = self.store.as_ref();
        let names = &self.config.collections;
        let mut reconciler =
            VariableReconciler::new(store, payload, self.config.missing_color.as_str());

        // Collections
        let mut collections = NameIndex::build(store.collections().await?);
        reconciler
            .remove_legacy_collections(&mut collections, &self.config.legacy_collections)
            .await;
        let global = reconciler
            .ensure_collection(&mut collections, &names.global_primitives)
            .await?;
        let semantic = reconciler
            .ensure_collection(&mut collections, &names.semantic)
            .await?;
        let components = reconciler
            .ensure_collection(&mut collections, &names.components)
            .await?;

        // Modes
        progress.message("Reconciling modes");
        let plans = plan_modes(&brand_ids, &self.config.themes);
        let semantic_modes =
            reconcile_modes(store, &semantic, &plans, &mut reconciler.diagnostics).await;
        let component_modes =
            reconcile_modes(store, &components, &plans, &mut reconciler.diagnostics).await;

        let surviving: Vec<ModePlan> = plans
            .iter()
            .filter(|p| {
                semantic_modes.bound.contains_key(&p.key) && component_modes.bound.contains_key(&p.key)
            })
            .cloned()
            .collect();

        for binding in [&semantic_modes, &component_modes] {
            report.renamed_modes += binding.renamed.len();
            report.created_modes += binding.created.len();
            report.removed_modes += binding.removed.len();
        }
        report.modes_synced = surviving.len();
        report.modes_skipped = plans
            .iter()
            .filter(|p| !surviving.contains(p))
            .map(|p| p.key.clone())
            .collect();
        if surviving.is_empty() {
            return Err(Error::NoModes);
        }

        let mut sync_brands: Vec<String> = Vec::new();
        for plan in &surviving {
            if !sync_brands.contains(&plan.brand) {
                sync_brands.push(plan.brand.clone());
            }
        }
        report.brands_skipped = brand_ids
            .iter()
            .filter(|b| !sync_brands.contains(b))
            .cloned()
            .collect();
        for brand in &report.brands_skipped {
            tracing::warn!(brand = %brand, "No modes left for brand, skipping");
        }
        let reference = sync_brands[0].clone();
        if ensure_component_tokens(payload, &reference).is_err() {
            reconciler
                .diagnostics
                .push(&reference, "reference brand has no component tokens");
        }
        progress.message(&format!(
            "{} modes ready ({} skipped)",
            surviving.len(),
            report.modes_skipped.len()
        ));

        // Brand primitive collections, only for brands with modes left
        let mut brand_collections = BTreeMap::new();
        for brand in &sync_brands {
            let name = names.brand_primitives(brand);
            match reconciler.ensure_collection(&mut collections, &name).await {
                Ok(collection) => {
                    brand_collections.insert(brand.clone(), collection);
                }
                Err(e) => reconciler
                    .diagnostics
                    .push(&name, format!("could not create collection: {e}")),
            }
        }

        // Primitives
        progress.message("Syncing global primitives");
        let global_vars = reconciler
            .sync_primitives(&global, &payload.global_primitives)
            .await;
        let mut brand_vars = BTreeMap::new();
        for brand in &sync_brands {
            let (Some(collection), Some(brand_payload)) =
                (brand_collections.get(brand), payload.brands.get(brand))
            else {
                continue;
            };
            progress.message(&format!("Syncing primitives for {brand}"));
            let vars = reconciler
                .sync_primitives(collection, &brand_payload.primitives)
                .await;
            brand_vars.insert(brand.clone(), vars);
        }

        // Semantic
        progress.message("Syncing semantic tokens");
        let semantic_outcome = reconciler
            .sync_semantic(
                &semantic,
                &semantic_modes,
                &surviving,
                &reference,
                &brand_vars,
                &global_vars,
            )
            .await;
        progress.message(&format!(
            "Semantic: {} variables, {} aliases",
            semantic_outcome.variables.len(),
            semantic_outcome.aliased.len()
        ));

        // Components
        progress.message("Syncing component tokens");
        let mut component_vars = reconciler
            .sync_components(
                &components,
                &component_modes,
                &surviving,
                &reference,
                &semantic_outcome,
            )
            .await;
        if self.config.prune_component_variables {
            reconciler
                .prune_components(&mut component_vars, &sync_brands)
                .await;
        }

        report.component_variables = component_vars
            .iter()
            .map(|v| (v.name.clone(), v.id.clone()))
            .collect();
        report.brands_synced = sync_brands;
        absorb(&mut report, reconciler);
        Ok(report.finish(true))
    }
}

/// Payload check that must pass before anything is written.
fn ensure_component_tokens(payload: &Payload, brand: &str) -> Result<()> {
    match payload.brands.get(brand) {
        Some(b) if !b.components.is_empty() => Ok(()),
        _ => Err(Error::NoComponentTokens {
            brand: brand.to_string(),
        }),
    }
}

/// Brand ids that only differ in the case of their first letter would
/// share modes and a primitive collection.
fn ensure_distinct_display_names(brands: &[String]) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for brand in brands {
        let name = display_name(brand);
        if let Some(first) = seen.insert(name.clone(), brand) {
            return Err(Error::BrandNameCollision {
                first: first.to_string(),
                second: brand.clone(),
                name,
            });
        }
    }
    Ok(())
}

fn absorb(report: &mut SyncReport, reconciler: VariableReconciler<'_>) {
    let counters = reconciler.counters;
    report.created += counters.created;
    report.updated += counters.updated;
    report.aliased += counters.aliased;
    report.deleted += counters.deleted;
    report.collections_created += counters.collections_created;
    report.collections_removed += counters.collections_removed;
    report.actions.extend(reconciler.actions);
    report.diagnostics.extend(reconciler.diagnostics.into_vec());
}
