//! Configuration resolution with hierarchical merge
//!
//! Configuration is loaded from a hierarchy of TOML files, later layers
//! overriding earlier ones:
//!
//! 1. Global defaults (`<config_dir>/tokensync/config.toml`)
//! 2. Project config (`tokensync.toml`)
//! 3. Local overrides (`tokensync.local.toml`), meant to stay untracked
//!
//! Tables are merged key by key, so a layer only needs to name what it
//! changes.

use std::fs;
use std::path::{Path, PathBuf};

use toml::Table;

use super::SyncConfig;
use crate::{Error, Result};

/// Project config file name
pub const PROJECT_CONFIG: &str = "tokensync.toml";
/// Local override file name
pub const LOCAL_CONFIG: &str = "tokensync.local.toml";

/// Resolves [`SyncConfig`] for a project root.
pub struct ConfigResolver {
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, the platform directory from `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
        }
    }

    /// Create a resolver with a custom global config directory.
    pub fn with_global_config_dir(root: impl Into<PathBuf>, global_config_dir: PathBuf) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: Some(global_config_dir),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref override_dir) = self.global_config_dir_override {
            return Some(override_dir.clone());
        }
        dirs::config_dir().map(|d| d.join("tokensync"))
    }

    /// Paths of every layer, in merge order, whether or not they exist.
    pub fn layers(&self) -> Vec<PathBuf> {
        let mut layers = Vec::with_capacity(3);
        if let Some(global_dir) = self.global_config_dir() {
            layers.push(global_dir.join("config.toml"));
        }
        layers.push(self.root.join(PROJECT_CONFIG));
        layers.push(self.root.join(LOCAL_CONFIG));
        layers
    }

    /// Merge every existing layer over the defaults.
    ///
    /// Missing layers are skipped; invalid TOML in any layer is an error.
    pub fn resolve(&self) -> Result<SyncConfig> {
        let mut merged = Table::new();

        for path in self.layers() {
            if !path.is_file() {
                tracing::debug!(?path, "No config layer found, skipping");
                continue;
            }
            tracing::debug!(?path, "Loading config layer");
            let layer = read_table(&path)?;
            deep_merge(&mut merged, layer);
        }

        let config_path = self.root.join(PROJECT_CONFIG);
        toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| Error::Config {
                path: config_path,
                message: e.to_string(),
            })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn has_config(&self) -> bool {
        self.root.join(PROJECT_CONFIG).is_file()
    }

    pub fn has_local_overrides(&self) -> bool {
        self.root.join(LOCAL_CONFIG).is_file()
    }
}

fn read_table(path: &Path) -> Result<Table> {
    let content = fs::read_to_string(path)?;
    content.parse::<Table>().map_err(|e| Error::Config {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        if let toml::Value::Table(incoming) = value {
            if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                deep_merge(existing, incoming);
            } else {
                base.insert(key, toml::Value::Table(incoming));
            }
        } else {
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokensync_meta::Theme;

    fn resolver(dir: &TempDir) -> ConfigResolver {
        ConfigResolver::with_global_config_dir(dir.path(), dir.path().join("global"))
    }

    #[test]
    fn resolve_returns_defaults_when_no_config_exists() {
        let dir = TempDir::new().unwrap();
        let resolver = resolver(&dir);

        assert!(!resolver.has_config());
        assert!(!resolver.has_local_overrides());
        assert_eq!(resolver.resolve().unwrap(), SyncConfig::default());
    }

    #[test]
    fn resolve_merges_local_overrides_on_top_of_project_config() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_CONFIG),
            r##"
missing_color = "#00FF00"

[collections]
semantic = "Tokens"
components = "Parts"
"##,
        )
        .unwrap();
        fs::write(
            dir.path().join(LOCAL_CONFIG),
            r#"
[collections]
components = "Local Parts"
"#,
        )
        .unwrap();

        let config = resolver(&dir).resolve().unwrap();
        assert_eq!(config.missing_color, "#00FF00");
        assert_eq!(config.collections.semantic, "Tokens");
        assert_eq!(config.collections.components, "Local Parts");
        assert_eq!(config.collections.global_primitives, "Primitive/Global");
    }

    #[test]
    fn global_layer_is_lowest_priority() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global");
        fs::create_dir_all(&global).unwrap();
        fs::write(
            global.join("config.toml"),
            "themes = [\"dark\"]\nprune_component_variables = true\n",
        )
        .unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG), "themes = [\"light\", \"dark\"]\n").unwrap();

        let config = resolver(&dir).resolve().unwrap();
        assert_eq!(config.themes, vec![Theme::Light, Theme::Dark]);
        assert!(config.prune_component_variables);
    }

    #[test]
    fn invalid_toml_names_the_layer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(LOCAL_CONFIG), "themes = [").unwrap();

        let err = resolver(&dir).resolve().unwrap_err();
        assert!(matches!(err, Error::Config { ref path, .. } if path.ends_with(LOCAL_CONFIG)));
    }

    #[test]
    fn unknown_theme_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_CONFIG), "themes = [\"sepia\"]\n").unwrap();

        assert!(matches!(resolver(&dir).resolve(), Err(Error::Config { .. })));
    }
}
