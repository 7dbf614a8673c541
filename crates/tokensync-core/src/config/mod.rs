//! Sync configuration
//!
//! Collection names, the theme list and a few behavioral switches are
//! configurable; everything else about the store layout is fixed by
//! [`crate::naming`].

mod resolver;

pub use resolver::{ConfigResolver, LOCAL_CONFIG, PROJECT_CONFIG};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokensync_meta::Theme;

use crate::naming::display_name;

/// Color written when a semantic mapping cannot be resolved.
pub const DEFAULT_MISSING_COLOR: &str = "#FF00FF";

/// Effective configuration after merging every layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Themes synced for every brand, in mode order
    pub themes: Vec<Theme>,

    pub collections: CollectionNames,

    /// Collections from older layouts that are removed before syncing
    pub legacy_collections: Vec<String>,

    /// Delete component variables no brand in the payload produces.
    ///
    /// Off by default: component variables are often bound in designs, and
    /// removing one breaks every binding that uses it.
    pub prune_component_variables: bool,

    /// Sentinel color for unresolvable semantic mappings
    pub missing_color: String,

    /// Store file used by the CLI, relative to the project root
    pub store_path: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            themes: Theme::ALL.to_vec(),
            collections: CollectionNames::default(),
            legacy_collections: vec!["Primitives".to_string()],
            prune_component_variables: false,
            missing_color: DEFAULT_MISSING_COLOR.to_string(),
            store_path: PathBuf::from(".tokensync/store.json"),
        }
    }
}

/// Names of the collections the engine owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionNames {
    pub global_primitives: String,
    /// Prefix of per-brand primitive collections, followed by the brand's
    /// display name
    pub brand_primitive_prefix: String,
    pub semantic: String,
    pub components: String,
}

impl Default for CollectionNames {
    fn default() -> Self {
        Self {
            global_primitives: "Primitive/Global".to_string(),
            brand_primitive_prefix: "Primitive/".to_string(),
            semantic: "Semantic".to_string(),
            components: "Components".to_string(),
        }
    }
}

impl CollectionNames {
    pub fn brand_primitives(&self, brand: &str) -> String {
        format!("{}{}", self.brand_primitive_prefix, display_name(brand))
    }
}
