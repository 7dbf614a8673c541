//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// tokensync - Push design tokens into a variable store
#[derive(Parser, Debug)]
#[command(name = "tokensync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root holding tokensync.toml (defaults to the nearest ancestor
    /// that has one, then the current directory)
    #[arg(short = 'C', long, global = true, value_name = "DIR", env = "TOKENSYNC_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a token graph into a payload
    ///
    /// Examples:
    ///   tokensync resolve tokens.json               # Print payload JSON
    ///   tokensync resolve tokens.yaml -o payload.json
    Resolve {
        /// Token graph (.json, .toml, .yaml)
        graph: PathBuf,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Check a token graph for broken references
    Validate {
        /// Token graph (.json, .toml, .yaml)
        graph: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Reconcile a graph or payload into the store
    Sync(SyncArgs),

    /// Preview what sync would change, without writing the store
    Plan(SyncArgs),

    /// Show what the store holds
    Status {
        /// Store file (overrides store_path in config)
        #[arg(long)]
        store: Option<PathBuf>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },
}

/// Arguments shared by `sync` and `plan`
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct SyncArgs {
    /// Token graph or resolved payload
    pub input: PathBuf,

    /// Store file (overrides store_path in config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// Read the input as a payload even if it looks like a graph
    #[arg(long)]
    pub payload: bool,

    /// Delete component variables no brand produces any more
    #[arg(long)]
    pub prune_components: bool,

    /// Output the report as JSON for CI/CD integration
    #[arg(long)]
    pub json: bool,
}
