//! tokensync CLI
//!
//! Resolve token graphs and reconcile them into a variable store on disk.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        println!("{} design token sync", "tokensync".green().bold());
        println!();
        println!("Run {} for available commands.", "tokensync --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let context = Context::load(&cwd, cli.root.as_deref())?;
    tracing::debug!(root = %context.root.display(), "Resolved project root");
    execute_command(&context, command)
}

fn execute_command(context: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Resolve { graph, out } => commands::run_resolve(context, &graph, out.as_deref()),
        Commands::Validate { graph, json } => commands::run_validate(&graph, json),
        Commands::Sync(args) => commands::run_sync(context, &args),
        Commands::Plan(args) => commands::run_plan(context, &args),
        Commands::Status { store, json } => commands::run_status(context, store.as_deref(), json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_user() {
        let error = error::CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }
}
