//! [`TestProject`] builder for tokensync project directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tokensync_meta::{Payload, TokenGraph};

/// A temporary project directory with helpers for writing inputs and
/// config.
///
/// # Example
///
/// ```rust,no_run
/// use tokensync_test_utils::TestProject;
/// use tokensync_test_utils::fixtures::two_brand_graph;
///
/// let project = TestProject::new();
/// let graph = project.write_graph("tokens.json", &two_brand_graph());
/// project.write_config("prune_component_variables = true\n");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the CLI keeps its store unless configured otherwise.
    pub fn store_path(&self) -> PathBuf {
        self.root().join(".tokensync").join("store.json")
    }

    /// Write a graph as JSON and return its path.
    pub fn write_graph(&self, name: &str, graph: &TokenGraph) -> PathBuf {
        self.write_json(name, &serde_json::to_string_pretty(graph).unwrap())
    }

    /// Write a payload as JSON and return its path.
    pub fn write_payload(&self, name: &str, payload: &Payload) -> PathBuf {
        self.write_json(name, &serde_json::to_string_pretty(payload).unwrap())
    }

    /// Write raw content and return its path.
    pub fn write_json(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write `tokensync.toml`.
    pub fn write_config(&self, content: &str) {
        fs::write(self.root().join("tokensync.toml"), content).unwrap();
    }

    pub fn assert_file_exists(&self, relative: &str) {
        let path = self.root().join(relative);
        assert!(path.exists(), "Expected file to exist: {}", path.display());
    }
}
