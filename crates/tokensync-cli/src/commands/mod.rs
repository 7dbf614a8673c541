//! Command implementations for tokensync-cli

pub mod plan;
pub mod resolve;
pub mod status;
pub mod sync;
pub mod validate;

pub use plan::run_plan;
pub use resolve::run_resolve;
pub use status::run_status;
pub use sync::run_sync;
pub use validate::run_validate;

use colored::Colorize;
use tokensync_core::{Diagnostic, Progress, SyncEngine, SyncEvent, SyncReport};
use tokensync_meta::Input;

use crate::error::Result;

/// Drive an async engine call from the synchronous command layer.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    Ok(runtime.block_on(future))
}

/// Run a graph or payload through the engine.
fn execute(engine: &SyncEngine, input: &Input, progress: &dyn Progress) -> Result<SyncReport> {
    let report = block_on(async {
        match input {
            Input::Graph(graph) => engine.sync_graph(graph, progress).await,
            Input::Payload(payload) => engine.sync(payload, progress).await,
        }
    })??;
    Ok(report)
}

/// Prints progress messages as they arrive.
struct PrintProgress;

impl Progress for PrintProgress {
    fn emit(&self, event: SyncEvent) {
        if let SyncEvent::Progress { message } = event {
            println!("   {} {}", "-".dimmed(), message);
        }
    }
}

fn print_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }
    println!();
    println!("{} {} diagnostics:", "WARN".yellow().bold(), diagnostics.len());
    for diagnostic in diagnostics {
        println!(
            "   {} {}: {}",
            "!".yellow(),
            diagnostic.path.cyan(),
            diagnostic.message
        );
    }
}

fn print_skipped(report: &SyncReport) {
    if !report.modes_skipped.is_empty() {
        println!(
            "   {} modes skipped: {}",
            "!".yellow(),
            report.modes_skipped.join(", ")
        );
    }
    if !report.brands_skipped.is_empty() {
        println!(
            "   {} brands skipped: {}",
            "!".yellow(),
            report.brands_skipped.join(", ")
        );
    }
}
