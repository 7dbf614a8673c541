//! Tests for the Resolver

use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use proptest::sample::Index;
use tokensync_core::Resolver;
use tokensync_meta::{
    Brand, ComponentDef, ComponentTokenDef, PrimitiveRef, Theme, TokenGraph, TokenType, TokenValue,
};
use tokensync_test_utils::fixtures::two_brand_graph;

fn chip_graph(sizes: &[String], values: &[f64], default: &str) -> TokenGraph {
    let mut graph = TokenGraph::default();
    graph.brands.insert(
        "acme".into(),
        Brand {
            component_defaults: BTreeMap::from([("chip".to_string(), default.to_string())]),
            ..Default::default()
        },
    );
    let height = ComponentTokenDef {
        kind: TokenType::Float,
        semantic: None,
        value: None,
        sizes: Some(
            sizes
                .iter()
                .cloned()
                .zip(values.iter().map(|v| TokenValue::Number(*v)))
                .collect(),
        ),
        target_path: "chip/height".into(),
        alias_of: None,
        unit: None,
        allowed_values: Vec::new(),
    };
    graph.components.insert(
        "chip".into(),
        ComponentDef {
            sizes: sizes.to_vec(),
            tokens: BTreeMap::from([("chip-height".to_string(), height)]),
        },
    );
    graph
}

fn palette_graph(colors: &[&str], index: usize) -> TokenGraph {
    let mut graph = TokenGraph::default();
    graph.global_primitives.insert(
        "gray".into(),
        colors.iter().map(|c| c.to_string()).collect(),
    );
    graph.brands.insert(
        "acme".into(),
        Brand {
            semantic_map: BTreeMap::from([("text".to_string(), PrimitiveRef::new("gray", index))]),
            ..Default::default()
        },
    );
    graph
}

// ============================================================================
// Two-brand graph
// ============================================================================

#[test]
fn test_two_brand_graph_resolves_without_diagnostics() {
    let graph = two_brand_graph();
    let resolution = Resolver::new(&graph).resolve();

    assert!(resolution.diagnostics.is_empty(), "{:?}", resolution.diagnostics);
    assert_eq!(resolution.payload.brand_ids(), vec!["acme", "zen"]);
    assert_eq!(resolution.payload.global_primitives, graph.global_primitives);
}

#[test]
fn test_component_paths_are_flattened() {
    let graph = two_brand_graph();
    let resolution = Resolver::new(&graph).resolve();

    let paths: Vec<&str> = resolution.payload.brands["acme"]
        .components
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        paths,
        vec![
            "button/filled-bg",
            "button/filled-text",
            "button/font-weight",
            "button/ghost-bg",
            "button/height-default",
            "button/height-lg",
            "button/height-md",
            "button/height-sm",
            "button/outline-text",
            "button/radius",
        ]
    );
}

#[test]
fn test_brand_defaults_and_overrides() {
    let graph = two_brand_graph();
    let payload = Resolver::new(&graph).resolve().payload;
    let acme = &payload.brands["acme"].components;
    let zen = &payload.brands["zen"].components;

    assert_eq!(acme["button/height-default"].alias_of.as_deref(), Some("button/height-md"));
    assert_eq!(acme["button/height-default"].value, Some(TokenValue::Number(42.0)));
    assert_eq!(zen["button/height-default"].alias_of.as_deref(), Some("button/height-sm"));
    assert_eq!(zen["button/height-default"].value, Some(TokenValue::Number(36.0)));

    assert_eq!(acme["button/radius"].value, Some(TokenValue::Number(6.0)));
    assert_eq!(zen["button/radius"].value, Some(TokenValue::Number(12.0)));
}

#[test]
fn test_color_entries_carry_semantic_alias_and_light_value() {
    let graph = two_brand_graph();
    let payload = Resolver::new(&graph).resolve().payload;
    let acme = &payload.brands["acme"].components;

    let filled = &acme["button/filled-bg"];
    assert_eq!(filled.kind, TokenType::Color);
    assert_eq!(filled.alias.as_deref(), Some("accent"));
    assert_eq!(filled.value, Some(TokenValue::from("#1971C2")));

    let ghost = &acme["button/ghost-bg"];
    assert_eq!(ghost.alias, None);
    assert_eq!(ghost.value, Some(TokenValue::from("transparent")));
}

#[test]
fn test_dark_only_semantic_key_is_resolved() {
    let graph = two_brand_graph();
    let payload = Resolver::new(&graph).resolve().payload;
    let zen = &payload.brands["zen"].semantic;

    assert!(!zen.get(Theme::Light).contains_key("glow"));
    let glow = &zen.get(Theme::Dark)["glow"];
    assert_eq!(glow.alias, "green/0");
    assert_eq!(glow.value.as_deref(), Some("#EBFBEE"));
}

#[test]
fn test_resolve_color_sentinels() {
    let graph = two_brand_graph();
    let resolver = Resolver::new(&graph).with_missing_color("#123456");

    assert_eq!(resolver.resolve_color("acme", Theme::Dark, Some("text-default")), "#FFFFFF");
    assert_eq!(resolver.resolve_color("acme", Theme::Light, None), "transparent");
    assert_eq!(resolver.resolve_color("acme", Theme::Light, Some("nope")), "#123456");
    assert_eq!(resolver.resolve_color("nobody", Theme::Light, Some("accent")), "#123456");
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_default_pointer_targets_an_emitted_size(
        values in proptest::collection::vec(1.0f64..500.0, 1..5),
        pick in any::<Index>(),
    ) {
        let sizes: Vec<String> = (0..values.len()).map(|i| format!("s{i}")).collect();
        let default = sizes[pick.index(sizes.len())].clone();
        let graph = chip_graph(&sizes, &values, &default);

        let resolution = Resolver::new(&graph).resolve();
        prop_assert!(resolution.diagnostics.is_empty());

        let components = &resolution.payload.brands["acme"].components;
        prop_assert_eq!(components.len(), sizes.len() + 1);
        for (size, value) in sizes.iter().zip(&values) {
            let entry = &components[&format!("chip/height-{size}")];
            prop_assert_eq!(entry.value.as_ref().and_then(TokenValue::as_f64), Some(*value));
        }

        let pointer = &components["chip/height-default"];
        let target = pointer.alias_of.clone().unwrap_or_default();
        prop_assert_eq!(&target, &format!("chip/height-{default}"));
        prop_assert_eq!(&pointer.value, &components[&target].value);
    }

    #[test]
    fn prop_resolve_color_is_palette_entry_or_sentinel(
        len in 0usize..4,
        index in 0usize..6,
        key in "[a-z]{1,6}",
    ) {
        let palette = ["#111111", "#222222", "#333333", "#444444"];
        let graph = palette_graph(&palette[..len], index);
        let color = Resolver::new(&graph).resolve_color("acme", Theme::Light, Some(&key));

        if key == "text" && index < len {
            prop_assert_eq!(color, palette[index]);
        } else {
            prop_assert_eq!(color, "#FF00FF");
        }
    }
}
