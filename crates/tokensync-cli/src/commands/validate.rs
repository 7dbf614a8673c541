//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use tokensync_meta::{Severity, TokenGraph, load_document, validate_graph};

use crate::error::{CliError, Result};

/// Run the validate command
///
/// Warnings are printed but only errors fail the command.
pub fn run_validate(graph_path: &Path, json: bool) -> Result<()> {
    let graph: TokenGraph = load_document(graph_path)?;
    let issues = validate_graph(&graph);
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();

    if json {
        println!("{}", serde_json::to_string_pretty(&issues)?);
    } else if issues.is_empty() {
        println!(
            "{} {} is valid ({} brands, {} components)",
            "OK".green().bold(),
            graph_path.display(),
            graph.brands.len(),
            graph.components.len()
        );
    } else {
        for issue in &issues {
            let marker = match issue.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warning => "WARN".yellow().bold(),
            };
            println!("{} {}: {}", marker, issue.location.cyan(), issue.message);
        }
    }

    if errors > 0 {
        return Err(CliError::user(format!(
            "{errors} validation errors in {}",
            graph_path.display()
        )));
    }
    Ok(())
}
