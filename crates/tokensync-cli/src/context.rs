//! Project context detection
//!
//! Finds the project root from any directory, git-style: the nearest
//! ancestor holding `tokensync.toml`, or the current directory when none
//! does. The root anchors configuration and the default store location.

use std::path::{Path, PathBuf};

use tokensync_core::config::PROJECT_CONFIG;
use tokensync_core::{ConfigResolver, SyncConfig};

use crate::error::Result;

/// Resolved root and the configuration layered onto it
#[derive(Debug, Clone)]
pub struct Context {
    pub root: PathBuf,
    pub config: SyncConfig,
}

impl Context {
    /// Detect the root (unless given) and resolve its configuration.
    pub fn load(cwd: &Path, root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => cwd.join(root),
            None => detect_root(cwd),
        };
        let config = ConfigResolver::new(root.clone()).resolve()?;
        Ok(Self { root, config })
    }

    /// Store file to use: the flag as given, else `store_path` under the root.
    pub fn store_path(&self, flag: Option<&Path>) -> PathBuf {
        match flag {
            Some(path) => path.to_path_buf(),
            None => self.root.join(&self.config.store_path),
        }
    }
}

/// Walk up from `cwd` looking for a project config.
pub fn detect_root(cwd: &Path) -> PathBuf {
    cwd.ancestors()
        .find(|dir| dir.join(PROJECT_CONFIG).is_file())
        .unwrap_or(cwd)
        .to_path_buf()
}
