//! Token graph and payload fixtures.
//!
//! [`scenario_payload`] is the smallest payload that touches every phase;
//! [`two_brand_graph`] is a realistic graph with dark overrides, sized
//! tokens and brand-specific defaults.

use std::collections::BTreeMap;

use tokensync_meta::{
    Brand, BrandPayload, ComponentDef, ComponentEntry, ComponentTokenDef, Payload, PrimitiveRef,
    SemanticEntry, TokenGraph, TokenType, TokenValue,
};

/// One global gray palette, one brand `acme` with a blue palette, one
/// semantic token aliasing `gray/1` and one component aliasing it.
pub fn scenario_payload() -> Payload {
    let mut acme = BrandPayload {
        primitives: BTreeMap::from([("blue".to_string(), vec!["#1971C2".to_string()])]),
        ..Default::default()
    };
    acme.semantic.light.insert(
        "text-default".to_string(),
        SemanticEntry {
            alias: "gray/1".to_string(),
            value: None,
        },
    );
    acme.components.insert(
        "button/filled-text".to_string(),
        ComponentEntry {
            kind: TokenType::Color,
            value: None,
            alias: Some("text-default".to_string()),
            alias_of: None,
        },
    );

    Payload {
        global_primitives: BTreeMap::from([(
            "gray".to_string(),
            vec!["#FFFFFF".to_string(), "#000000".to_string()],
        )]),
        brands: BTreeMap::from([("acme".to_string(), acme)]),
    }
}

/// [`scenario_payload`] with the semantic token pointing past the end of
/// the gray palette.
pub fn out_of_range_payload() -> Payload {
    let mut payload = scenario_payload();
    if let Some(acme) = payload.brands.get_mut("acme")
        && let Some(entry) = acme.semantic.light.get_mut("text-default")
    {
        entry.alias = "gray/5".to_string();
    }
    payload
}

fn token(kind: TokenType, target_path: &str) -> ComponentTokenDef {
    ComponentTokenDef {
        kind,
        semantic: None,
        value: None,
        sizes: None,
        target_path: target_path.to_string(),
        alias_of: None,
        unit: None,
        allowed_values: Vec::new(),
    }
}

fn color(target_path: &str, semantic: Option<&str>) -> ComponentTokenDef {
    ComponentTokenDef {
        semantic: semantic.map(str::to_string),
        ..token(TokenType::Color, target_path)
    }
}

fn sized(target_path: &str, sizes: &[(&str, f64)]) -> ComponentTokenDef {
    ComponentTokenDef {
        sizes: Some(
            sizes
                .iter()
                .map(|(k, v)| (k.to_string(), TokenValue::Number(*v)))
                .collect(),
        ),
        unit: Some("px".to_string()),
        ..token(TokenType::Float, target_path)
    }
}

fn semantic(entries: &[(&str, &str, usize)]) -> BTreeMap<String, PrimitiveRef> {
    entries
        .iter()
        .map(|(key, palette, index)| (key.to_string(), PrimitiveRef::new(*palette, *index)))
        .collect()
}

/// Two brands (`acme`, `zen`) sharing a `button` component.
///
/// - `acme` defaults button sizes to `md`, `zen` to `sm`
/// - `zen` overrides the radius and adds a dark-only semantic key `glow`
/// - `button/ghost-bg` has no semantic key and resolves to transparent
pub fn two_brand_graph() -> TokenGraph {
    let mut graph = TokenGraph::default();
    graph.global_primitives.insert(
        "gray".to_string(),
        vec![
            "#FFFFFF".to_string(),
            "#F1F3F5".to_string(),
            "#495057".to_string(),
            "#000000".to_string(),
        ],
    );

    graph.brands.insert(
        "acme".to_string(),
        Brand {
            primitives: BTreeMap::from([(
                "blue".to_string(),
                vec!["#E7F5FF".to_string(), "#1971C2".to_string()],
            )]),
            semantic_map: semantic(&[
                ("text-default", "gray", 3),
                ("surface", "gray", 0),
                ("accent", "blue", 1),
            ]),
            dark_semantic_overrides: semantic(&[("text-default", "gray", 0), ("surface", "gray", 3)]),
            dimension_overrides: BTreeMap::new(),
            component_defaults: BTreeMap::from([("button".to_string(), "md".to_string())]),
        },
    );

    graph.brands.insert(
        "zen".to_string(),
        Brand {
            primitives: BTreeMap::from([(
                "green".to_string(),
                vec!["#EBFBEE".to_string(), "#2F9E44".to_string()],
            )]),
            semantic_map: semantic(&[
                ("text-default", "gray", 2),
                ("surface", "gray", 1),
                ("accent", "green", 1),
            ]),
            dark_semantic_overrides: semantic(&[("glow", "green", 0)]),
            dimension_overrides: BTreeMap::from([(
                "button-radius".to_string(),
                BTreeMap::from([("_value".to_string(), TokenValue::Number(12.0))]),
            )]),
            component_defaults: BTreeMap::from([("button".to_string(), "sm".to_string())]),
        },
    );

    let radius = ComponentTokenDef {
        value: Some(TokenValue::Number(6.0)),
        unit: Some("px".to_string()),
        ..token(TokenType::Float, "button/radius")
    };
    let weight = ComponentTokenDef {
        value: Some(TokenValue::Text("600".to_string())),
        allowed_values: vec!["400".to_string(), "600".to_string()],
        ..token(TokenType::String, "button/font-weight")
    };

    graph.components.insert(
        "button".to_string(),
        ComponentDef {
            sizes: vec!["sm".to_string(), "md".to_string(), "lg".to_string()],
            tokens: BTreeMap::from([
                ("button-filled-bg".to_string(), color("button/filled-bg", Some("accent"))),
                ("button-filled-text".to_string(), color("button/filled-text", Some("surface"))),
                ("button-outline-text".to_string(), color("button/outline-text", Some("text-default"))),
                ("button-ghost-bg".to_string(), color("button/ghost-bg", None)),
                (
                    "button-height".to_string(),
                    sized("button/height", &[("sm", 36.0), ("md", 42.0), ("lg", 50.0)]),
                ),
                ("button-radius".to_string(), radius),
                ("button-font-weight".to_string(), weight),
            ]),
        },
    );

    graph
}

/// [`two_brand_graph`] as pretty JSON.
pub fn two_brand_graph_json() -> String {
    serde_json::to_string_pretty(&two_brand_graph()).unwrap_or_default()
}
