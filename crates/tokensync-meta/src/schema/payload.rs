//! Resolved payload schema - the wire format between editor and sync engine
//!
//! One object keyed by brand id, plus the reserved `globalPrimitives` key:
//!
//! ```json
//! {
//!   "globalPrimitives": { "gray": ["#FFFFFF", "#000000"] },
//!   "acme": {
//!     "primitives": { "blue": ["#1971C2"] },
//!     "semantic": { "light": { "text-default": { "alias": "gray/1", "value": "#000000" } }, "dark": {} },
//!     "components": { "button/filled-text": { "type": "COLOR", "value": "#000000", "alias": "text-default" } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::graph::Palettes;
use super::types::{Theme, TokenType, TokenValue};

/// Fully resolved snapshot of every brand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(rename = "globalPrimitives", default)]
    pub global_primitives: Palettes,
    #[serde(flatten)]
    pub brands: BTreeMap<String, BrandPayload>,
}

impl Payload {
    pub fn brand_ids(&self) -> Vec<&str> {
        self.brands.keys().map(String::as_str).collect()
    }

    /// SHA-256 over the canonical JSON encoding.
    ///
    /// Maps are ordered, so equal payloads always hash equally.
    pub fn fingerprint(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        format!("{:x}", hasher.finalize())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrandPayload {
    #[serde(default)]
    pub primitives: Palettes,
    #[serde(default)]
    pub semantic: ThemedSemantic,
    /// Target path (plus `-<size>` suffix when sized) to entry
    #[serde(default)]
    pub components: BTreeMap<String, ComponentEntry>,
}

/// Resolved semantic tokens per theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemedSemantic {
    #[serde(default)]
    pub light: BTreeMap<String, SemanticEntry>,
    #[serde(default)]
    pub dark: BTreeMap<String, SemanticEntry>,
}

impl ThemedSemantic {
    pub fn get(&self, theme: Theme) -> &BTreeMap<String, SemanticEntry> {
        match theme {
            Theme::Light => &self.light,
            Theme::Dark => &self.dark,
        }
    }

    pub fn get_mut(&mut self, theme: Theme) -> &mut BTreeMap<String, SemanticEntry> {
        match theme {
            Theme::Light => &mut self.light,
            Theme::Dark => &mut self.dark,
        }
    }
}

/// A semantic token for one brand and theme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticEntry {
    /// Originating primitive as `"palette/index"`
    pub alias: String,
    /// Resolved hex, used as a literal when the primitive cannot be aliased
    #[serde(default)]
    pub value: Option<String>,
}

/// A component token for one brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentEntry {
    #[serde(rename = "type")]
    pub kind: TokenType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TokenValue>,
    /// Semantic key a COLOR token aliases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Component path this entry points at instead of holding a literal
    #[serde(rename = "aliasOf", default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl ComponentEntry {
    pub fn literal(kind: TokenType, value: Option<TokenValue>) -> Self {
        Self {
            kind,
            value,
            alias: None,
            alias_of: None,
        }
    }
}
