//! Outcome of a sync run

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostic::Diagnostic;
use crate::store::VariableId;

/// Report from a sync run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    /// Whether the run completed; diagnostics do not make it fail
    pub success: bool,
    /// Variables created
    pub created: usize,
    /// Literal values written
    pub updated: usize,
    /// Alias values written
    pub aliased: usize,
    /// Variables deleted
    pub deleted: usize,
    pub collections_created: usize,
    pub collections_removed: usize,
    pub renamed_modes: usize,
    pub created_modes: usize,
    pub removed_modes: usize,
    /// Modes bound in every multi-mode collection
    pub modes_synced: usize,
    /// Keys of planned modes some collection could not hold
    pub modes_skipped: Vec<String>,
    pub brands_synced: Vec<String>,
    /// Brands with no mode left to write to
    pub brands_skipped: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    /// Notable actions taken, in order
    pub actions: Vec<String>,
    /// Component variable name to id, for whatever builds on the variables
    pub component_variables: BTreeMap<String, VariableId>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncReport {
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>) -> Self {
        Self {
            run_id,
            success: false,
            created: 0,
            updated: 0,
            aliased: 0,
            deleted: 0,
            collections_created: 0,
            collections_removed: 0,
            renamed_modes: 0,
            created_modes: 0,
            removed_modes: 0,
            modes_synced: 0,
            modes_skipped: Vec::new(),
            brands_synced: Vec::new(),
            brands_skipped: Vec::new(),
            diagnostics: Vec::new(),
            actions: Vec::new(),
            component_variables: BTreeMap::new(),
            started_at,
            finished_at: None,
        }
    }

    /// Add an action to the report
    pub fn with_action(mut self, action: String) -> Self {
        self.actions.push(action);
        self
    }

    /// Mark the run finished.
    pub fn finish(mut self, success: bool) -> Self {
        self.success = success;
        self.finished_at = Some(Utc::now());
        self
    }

    /// True when the run changed no structure: no variables, collections or
    /// modes were created, renamed or removed.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created == 0
            && self.deleted == 0
            && self.collections_created == 0
            && self.collections_removed == 0
            && self.renamed_modes == 0
            && self.created_modes == 0
            && self.removed_modes == 0
    }

    /// One-line summary.
    pub fn summary(&self) -> String {
        let mut message = format!(
            "Sync complete! {} vars, {} aliases, {} modes",
            self.created, self.aliased, self.modes_synced
        );
        if !self.modes_skipped.is_empty() {
            message.push_str(&format!(" ({} modes skipped)", self.modes_skipped.len()));
        }
        message
    }
}
