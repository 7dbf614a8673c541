//! Resolve command implementation

use std::path::Path;

use colored::Colorize;
use tokensync_core::Resolver;
use tokensync_meta::{TokenGraph, load_document, save_document};

use crate::context::Context;
use crate::error::Result;

/// Run the resolve command
///
/// The payload goes to stdout (or `out`); diagnostics go to stderr so the
/// JSON stays pipeable.
pub fn run_resolve(context: &Context, graph_path: &Path, out: Option<&Path>) -> Result<()> {
    let graph: TokenGraph = load_document(graph_path)?;
    let resolution = Resolver::new(&graph)
        .with_missing_color(context.config.missing_color.as_str())
        .resolve();

    for diagnostic in &resolution.diagnostics {
        eprintln!(
            "{} {}: {}",
            "warning".yellow().bold(),
            diagnostic.path,
            diagnostic.message
        );
    }

    match out {
        Some(path) => {
            save_document(path, &resolution.payload)?;
            println!(
                "{} Resolved {} brands into {}",
                "OK".green().bold(),
                resolution.payload.brands.len(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&resolution.payload)?),
    }

    Ok(())
}
