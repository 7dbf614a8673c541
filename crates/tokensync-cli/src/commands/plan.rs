//! Plan command implementation
//!
//! A dry run: the store document is loaded into memory and synced there, so
//! the report shows what `sync` would do without touching the file.

use std::sync::Arc;

use colored::Colorize;
use tokensync_core::{MemoryStore, NullProgress, StoreDocument, SyncEngine};
use tokensync_meta::load_input;

use super::sync::run_config;
use super::{execute, print_diagnostics, print_skipped};
use crate::cli::SyncArgs;
use crate::context::Context;
use crate::error::Result;

/// Run the plan command
pub fn run_plan(context: &Context, args: &SyncArgs) -> Result<()> {
    let input = load_input(&args.input, args.payload)?;
    let store_path = context.store_path(args.store.as_deref());
    let document = StoreDocument::read(&store_path)?;

    let store = Arc::new(MemoryStore::from_state(document.state));
    let engine = SyncEngine::new(store.clone(), run_config(context, args));
    let report = execute(&engine, &input, &NullProgress)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} Plan for {} (nothing written)",
        "=>".blue().bold(),
        store_path.display().to_string().cyan()
    );
    if report.is_structurally_unchanged() {
        println!(
            "{} No structural changes. {} values would be rewritten.",
            "OK".green().bold(),
            report.updated + report.aliased
        );
    } else {
        let stats = store.stats();
        let lines = [
            ("collections created", stats.collections_created),
            ("collections removed", stats.collections_removed),
            ("modes added", stats.modes_added),
            ("modes renamed", stats.modes_renamed),
            ("modes removed", stats.modes_removed),
            ("variables created", stats.variables_created),
            ("variables removed", stats.variables_removed),
        ];
        for (label, count) in lines.into_iter().filter(|(_, count)| *count > 0) {
            println!("   {} {} {}", "+".green(), count, label);
        }
        println!("   {} {} values written", "~".blue(), stats.values_set);
    }
    for action in &report.actions {
        println!("   {} {}", "-".dimmed(), action);
    }
    print_skipped(&report);
    print_diagnostics(&report.diagnostics);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use tokensync_test_utils::fixtures::two_brand_graph_json;

    #[test]
    fn test_plan_leaves_store_untouched() {
        let temp = TempDir::new().unwrap();
        let graph = temp.path().join("tokens.json");
        fs::write(&graph, two_brand_graph_json()).unwrap();
        let context = Context::load(temp.path(), None).unwrap();
        let args = SyncArgs {
            input: graph,
            store: None,
            payload: false,
            prune_components: false,
            json: false,
        };

        run_plan(&context, &args).unwrap();

        assert!(!context.store_path(None).exists());
    }
}
