//! Sync command implementation
//!
//! Reconciles a graph or payload into the file store under the project root.

use std::sync::Arc;

use colored::Colorize;
use tokensync_core::{FileStore, LogProgress, Progress, SyncConfig, SyncEngine};
use tokensync_meta::load_input;

use super::{PrintProgress, execute, print_diagnostics, print_skipped};
use crate::cli::SyncArgs;
use crate::context::Context;
use crate::error::Result;

/// Configuration for a run: the project config with CLI flags applied.
pub(super) fn run_config(context: &Context, args: &SyncArgs) -> SyncConfig {
    let mut config = context.config.clone();
    if args.prune_components {
        config.prune_component_variables = true;
    }
    config
}

/// Run the sync command
pub fn run_sync(context: &Context, args: &SyncArgs) -> Result<()> {
    let input = load_input(&args.input, args.payload)?;
    let store_path = context.store_path(args.store.as_deref());

    if !args.json {
        println!(
            "{} Syncing {} into {}",
            "=>".blue().bold(),
            args.input.display(),
            store_path.display().to_string().cyan()
        );
    }

    let store = Arc::new(FileStore::open(&store_path)?);
    let engine = SyncEngine::new(store, run_config(context, args));
    // JSON runs keep stdout for the report; progress goes to the log on stderr
    let progress: &dyn Progress = if args.json { &LogProgress } else { &PrintProgress };
    let report = execute(&engine, &input, progress)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {}", "OK".green().bold(), report.summary());
    print_skipped(&report);
    print_diagnostics(&report.diagnostics);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tokensync_core::StoreDocument;
    use tokensync_test_utils::fixtures::two_brand_graph_json;

    fn args(input: &Path) -> SyncArgs {
        SyncArgs {
            input: input.to_path_buf(),
            store: None,
            payload: false,
            prune_components: false,
            json: false,
        }
    }

    #[test]
    fn test_sync_writes_default_store() {
        let temp = TempDir::new().unwrap();
        let graph = temp.path().join("tokens.json");
        fs::write(&graph, two_brand_graph_json()).unwrap();
        let context = Context::load(temp.path(), None).unwrap();

        run_sync(&context, &args(&graph)).unwrap();

        let document = StoreDocument::read(&context.store_path(None)).unwrap();
        assert!(document.last_payload_fingerprint.is_some());
        assert!(document.state.collection_named("Components").is_some());
    }

    #[test]
    fn test_prune_flag_overrides_config() {
        let temp = TempDir::new().unwrap();
        let context = Context::load(temp.path(), None).unwrap();
        let mut args = args(Path::new("tokens.json"));

        assert!(!run_config(&context, &args).prune_component_variables);
        args.prune_components = true;
        assert!(run_config(&context, &args).prune_component_variables);
    }
}
