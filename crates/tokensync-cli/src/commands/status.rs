//! Status command implementation

use std::path::Path;

use colored::Colorize;
use serde::Serialize;
use tokensync_core::StoreDocument;

use crate::context::Context;
use crate::error::Result;

#[derive(Debug, Serialize)]
struct CollectionStatus {
    name: String,
    modes: Vec<String>,
    variables: usize,
}

#[derive(Debug, Serialize)]
struct StoreStatus {
    path: String,
    exists: bool,
    last_payload_fingerprint: Option<String>,
    last_synced_at: Option<String>,
    collections: Vec<CollectionStatus>,
}

impl StoreStatus {
    fn from_document(path: &Path, document: &StoreDocument) -> Self {
        let collections = document
            .state
            .collections
            .iter()
            .map(|collection| CollectionStatus {
                name: collection.name.clone(),
                modes: collection.mode_names().into_iter().map(String::from).collect(),
                variables: document
                    .state
                    .variables
                    .iter()
                    .filter(|v| v.collection == collection.id)
                    .count(),
            })
            .collect();
        Self {
            path: path.display().to_string(),
            exists: path.exists(),
            last_payload_fingerprint: document.last_payload_fingerprint.clone(),
            last_synced_at: document.last_synced_at.map(|t| t.to_rfc3339()),
            collections,
        }
    }
}

/// Run the status command
pub fn run_status(context: &Context, store: Option<&Path>, json: bool) -> Result<()> {
    let path = context.store_path(store);
    let document = StoreDocument::read(&path)?;
    let status = StoreStatus::from_document(&path, &document);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    if !status.exists {
        println!("{}", "No store yet".yellow().bold());
        println!();
        println!("Run {} to create one.", "tokensync sync <graph>".cyan());
        return Ok(());
    }

    println!("{}", "Store Status".bold());
    println!();
    println!("{}:   {}", "Path".dimmed(), status.path);
    match (&status.last_payload_fingerprint, &status.last_synced_at) {
        (Some(fingerprint), Some(at)) => {
            let short = fingerprint.get(..12).unwrap_or(fingerprint);
            println!("{}:   {} at {}", "Synced".dimmed(), short.cyan(), at);
        }
        _ => println!("{}:   {}", "Synced".dimmed(), "never".yellow()),
    }
    println!();

    println!("{}:", "Collections".bold());
    if status.collections.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for collection in &status.collections {
        println!(
            "  {} {} ({} variables)",
            "+".green(),
            collection.name.cyan(),
            collection.variables
        );
        println!("      {}", collection.modes.join(", ").dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokensync_core::SyncConfig;

    #[test]
    fn test_status_without_store() {
        let temp = TempDir::new().unwrap();
        let context = Context {
            root: temp.path().to_path_buf(),
            config: SyncConfig::default(),
        };

        assert!(run_status(&context, None, false).is_ok());
        assert!(run_status(&context, None, true).is_ok());
    }
}
