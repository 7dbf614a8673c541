//! Token graph schema - the editor's source of truth
//!
//! # Example JSON
//!
//! ```json
//! {
//!   "globalPrimitives": { "gray": ["#FFFFFF", "#000000"] },
//!   "brands": {
//!     "acme": {
//!       "primitives": { "blue": ["#1971C2"] },
//!       "semanticMap": { "text-default": { "palette": "gray", "index": 1 } },
//!       "componentDefaults": { "button-height": "md" }
//!     }
//!   },
//!   "components": {
//!     "button": {
//!       "sizes": ["sm", "md"],
//!       "tokens": {
//!         "button-filled-text": { "type": "COLOR", "semantic": "text-default", "targetPath": "button/filled-text" },
//!         "button-height": { "type": "FLOAT", "sizes": { "sm": 36, "md": 42 }, "targetPath": "button/height" }
//!       }
//!     }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{PrimitiveRef, Theme, TokenType, TokenValue};

/// Palette name to ordered hex colors.
pub type Palettes = BTreeMap<String, Vec<String>>;

/// Size key used in dimension overrides for tokens without size variants.
pub const VALUE_SIZE_KEY: &str = "_value";

/// The complete multi-brand token hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenGraph {
    /// Brand-independent primitives shared by every brand
    #[serde(default)]
    pub global_primitives: Palettes,
    /// Brands keyed by id
    #[serde(default)]
    pub brands: BTreeMap<String, Brand>,
    /// Component token definitions keyed by component name
    #[serde(default)]
    pub components: BTreeMap<String, ComponentDef>,
}

/// Per-brand primitives, semantic mapping and overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    #[serde(default)]
    pub primitives: Palettes,
    /// Semantic key to primitive, used for the light theme
    #[serde(default)]
    pub semantic_map: BTreeMap<String, PrimitiveRef>,
    /// Entries merged over `semantic_map` when resolving the dark theme
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dark_semantic_overrides: BTreeMap<String, PrimitiveRef>,
    /// Token name to size key (or [`VALUE_SIZE_KEY`]) to value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dimension_overrides: BTreeMap<String, BTreeMap<String, TokenValue>>,
    /// Token name or component name to the size key used as the default
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_defaults: BTreeMap<String, String>,
}

impl Brand {
    /// Semantic mapping for a theme; dark overrides win over the light map.
    pub fn semantic_for(&self, theme: Theme) -> BTreeMap<&str, &PrimitiveRef> {
        let mut merged: BTreeMap<&str, &PrimitiveRef> = self
            .semantic_map
            .iter()
            .map(|(k, v)| (k.as_str(), v))
            .collect();
        if theme == Theme::Dark {
            for (key, reference) in &self.dark_semantic_overrides {
                merged.insert(key.as_str(), reference);
            }
        }
        merged
    }

    /// Look up a hex color in this brand's own palettes.
    pub fn primitive(&self, reference: &PrimitiveRef) -> Option<&str> {
        lookup(&self.primitives, reference)
    }
}

/// A component and its token definitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentDef {
    /// Ordered size keys for sized tokens
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub tokens: BTreeMap<String, ComponentTokenDef>,
}

/// One component token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentTokenDef {
    #[serde(rename = "type")]
    pub kind: TokenType,
    /// Semantic key for COLOR tokens; `None` means transparent
    #[serde(default)]
    pub semantic: Option<String>,
    /// Single value for FLOAT/STRING tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<TokenValue>,
    /// Per-size values for sized FLOAT/STRING tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizes: Option<BTreeMap<String, TokenValue>>,
    /// Stable variable name in the store, independent of brand and theme
    pub target_path: String,
    /// Another token this one points at instead of holding a value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_values: Vec<String>,
}

impl ComponentTokenDef {
    pub fn is_sized(&self) -> bool {
        self.sizes.is_some()
    }
}

impl TokenGraph {
    /// Brand ids in deterministic order.
    pub fn brand_ids(&self) -> Vec<&str> {
        self.brands.keys().map(String::as_str).collect()
    }

    /// Find a token definition by name, with its component name.
    pub fn find_token(&self, token_name: &str) -> Option<(&str, &ComponentTokenDef)> {
        self.components.iter().find_map(|(component, def)| {
            def.tokens
                .get(token_name)
                .map(|token| (component.as_str(), token))
        })
    }

    /// Size keys of a sized token, in the component's declared order.
    ///
    /// Falls back to the token's own size map when the component declares
    /// no order.
    pub fn size_keys(&self, component: &str, token: &ComponentTokenDef) -> Vec<String> {
        let Some(sizes) = &token.sizes else {
            return Vec::new();
        };
        let declared = self
            .components
            .get(component)
            .map(|c| c.sizes.as_slice())
            .unwrap_or_default();
        if declared.is_empty() {
            sizes.keys().cloned().collect()
        } else {
            declared.to_vec()
        }
    }

    /// Look up a hex color in the shared palettes.
    pub fn global_primitive(&self, reference: &PrimitiveRef) -> Option<&str> {
        lookup(&self.global_primitives, reference)
    }
}

fn lookup<'a>(palettes: &'a Palettes, reference: &PrimitiveRef) -> Option<&'a str> {
    palettes
        .get(&reference.palette)
        .and_then(|colors| colors.get(reference.index))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn brand() -> Brand {
        Brand {
            primitives: BTreeMap::from([("blue".into(), vec!["#1971C2".into()])]),
            semantic_map: BTreeMap::from([
                ("text".into(), PrimitiveRef::new("gray", 1)),
                ("accent".into(), PrimitiveRef::new("blue", 0)),
            ]),
            dark_semantic_overrides: BTreeMap::from([("text".into(), PrimitiveRef::new("gray", 0))]),
            ..Default::default()
        }
    }

    #[test]
    fn dark_overrides_merge_over_light() {
        let brand = brand();
        let light = brand.semantic_for(Theme::Light);
        let dark = brand.semantic_for(Theme::Dark);

        assert_eq!(light["text"], &PrimitiveRef::new("gray", 1));
        assert_eq!(dark["text"], &PrimitiveRef::new("gray", 0));
        assert_eq!(dark["accent"], &PrimitiveRef::new("blue", 0));
    }

    #[test]
    fn primitive_lookup_is_bounds_checked() {
        let brand = brand();
        assert_eq!(brand.primitive(&PrimitiveRef::new("blue", 0)), Some("#1971C2"));
        assert_eq!(brand.primitive(&PrimitiveRef::new("blue", 1)), None);
        assert_eq!(brand.primitive(&PrimitiveRef::new("red", 0)), None);
    }

    #[test]
    fn parses_camel_case_document() {
        let json = r##"{
            "globalPrimitives": { "gray": ["#FFFFFF", "#000000"] },
            "brands": { "acme": { "semanticMap": { "text": { "palette": "gray", "index": 1 } } } },
            "components": { "button": { "sizes": ["sm", "md"], "tokens": {
                "button-height": { "type": "FLOAT", "sizes": { "sm": 36, "md": 42 }, "targetPath": "button/height" }
            } } }
        }"##;
        let graph: TokenGraph = serde_json::from_str(json).unwrap();

        assert_eq!(graph.brand_ids(), vec!["acme"]);
        let (component, token) = graph.find_token("button-height").unwrap();
        assert_eq!(component, "button");
        assert!(token.is_sized());
        assert_eq!(graph.size_keys(component, token), vec!["sm", "md"]);
    }

    #[test]
    fn size_keys_fall_back_to_token_sizes() {
        let mut graph = TokenGraph::default();
        let token = ComponentTokenDef {
            kind: TokenType::Float,
            semantic: None,
            value: None,
            sizes: Some(BTreeMap::from([
                ("lg".into(), TokenValue::Number(3.0)),
                ("md".into(), TokenValue::Number(2.0)),
            ])),
            target_path: "chip/height".into(),
            alias_of: None,
            unit: None,
            allowed_values: Vec::new(),
        };
        graph.components.insert(
            "chip".into(),
            ComponentDef {
                sizes: Vec::new(),
                tokens: BTreeMap::from([("chip-height".into(), token.clone())]),
            },
        );

        assert_eq!(graph.size_keys("chip", &token), vec!["lg", "md"]);
    }
}
