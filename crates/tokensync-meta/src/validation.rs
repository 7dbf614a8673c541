//! Non-fatal validation of a token graph
//!
//! The resolver never aborts on a malformed brand; it substitutes a
//! sentinel and moves on. Validation surfaces the same problems up front so
//! they can be fixed in the editor before a sync.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::color::{TRANSPARENT, is_hex_color};
use crate::schema::{Palettes, Theme, TokenGraph, TokenType, TokenValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Resolution degrades but the graph is usable
    Warning,
    /// The graph cannot be synced faithfully
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single finding, located by a slash-separated path into the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub location: String,
    pub message: String,
}

impl ValidationIssue {
    fn warning(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }

    fn error(location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.severity, self.location, self.message)
    }
}

/// Validate a graph, returning findings ordered errors first.
pub fn validate_graph(graph: &TokenGraph) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    check_palettes("globalPrimitives", &graph.global_primitives, &mut issues);

    for (brand_id, brand) in &graph.brands {
        let base = format!("brands/{brand_id}");
        check_palettes(&format!("{base}/primitives"), &brand.primitives, &mut issues);

        for theme in Theme::ALL {
            for (key, reference) in brand.semantic_for(theme) {
                if brand.primitive(reference).is_none()
                    && graph.global_primitive(reference).is_none()
                {
                    issues.push(ValidationIssue::warning(
                        format!("{base}/semantic/{theme}/{key}"),
                        format!("primitive {reference} not found in brand or global palettes"),
                    ));
                }
            }
        }

        for key in brand.dark_semantic_overrides.keys() {
            if !brand.semantic_map.contains_key(key) {
                issues.push(ValidationIssue::warning(
                    format!("{base}/darkSemanticOverrides/{key}"),
                    "dark override has no light mapping",
                ));
            }
        }

        for (name, size) in &brand.component_defaults {
            let declared = match graph.find_token(name) {
                Some((component, token)) => graph.size_keys(component, token),
                None => match graph.components.get(name) {
                    Some(component) => component.sizes.clone(),
                    None => {
                        issues.push(ValidationIssue::warning(
                            format!("{base}/componentDefaults/{name}"),
                            "no token or component with this name",
                        ));
                        continue;
                    }
                },
            };
            if !declared.is_empty() && !declared.contains(size) {
                issues.push(ValidationIssue::warning(
                    format!("{base}/componentDefaults/{name}"),
                    format!("default size {size:?} is not declared"),
                ));
            }
        }
    }

    let mut target_paths: BTreeMap<&str, &str> = BTreeMap::new();
    let semantic_keys: BTreeSet<&str> = graph
        .brands
        .values()
        .flat_map(|b| b.semantic_map.keys().map(String::as_str))
        .collect();

    for (component_name, component) in &graph.components {
        for (token_name, token) in &component.tokens {
            let location = format!("components/{component_name}/{token_name}");

            if token.target_path.trim().is_empty() {
                issues.push(ValidationIssue::error(&location, "targetPath is empty"));
            } else if let Some(previous) = target_paths.insert(token.target_path.as_str(), token_name.as_str()) {
                issues.push(ValidationIssue::error(
                    &location,
                    format!(
                        "targetPath {:?} is already used by {previous}",
                        token.target_path
                    ),
                ));
            }

            if let Some(target) = &token.alias_of {
                if target == token_name {
                    issues.push(ValidationIssue::error(&location, "aliasOf points at itself"));
                } else if graph.find_token(target).is_none() {
                    issues.push(ValidationIssue::error(
                        &location,
                        format!("aliasOf target {target:?} does not exist"),
                    ));
                }
            }

            match token.kind {
                TokenType::Color => {
                    if let Some(key) = &token.semantic
                        && !semantic_keys.contains(key.as_str())
                    {
                        issues.push(ValidationIssue::warning(
                            &location,
                            format!("semantic key {key:?} is not mapped by any brand"),
                        ));
                    }
                }
                TokenType::Float | TokenType::String => {
                    if token.alias_of.is_none() && token.value.is_none() && token.sizes.is_none() {
                        issues.push(ValidationIssue::warning(&location, "token has no value"));
                    }
                    if token.kind == TokenType::String && !token.allowed_values.is_empty() {
                        let values = token
                            .value
                            .iter()
                            .chain(token.sizes.iter().flat_map(|s| s.values()));
                        for value in values {
                            check_allowed(&location, value, &token.allowed_values, &mut issues);
                        }
                    }
                }
            }
        }
    }

    issues.sort_by(|a, b| b.severity.cmp(&a.severity));
    issues
}

fn check_palettes(location: &str, palettes: &Palettes, issues: &mut Vec<ValidationIssue>) {
    for (palette, colors) in palettes {
        for (index, color) in colors.iter().enumerate() {
            if color != TRANSPARENT && !is_hex_color(color) {
                issues.push(ValidationIssue::error(
                    format!("{location}/{palette}/{index}"),
                    format!("{color:?} is not a hex color"),
                ));
            }
        }
    }
}

fn check_allowed(
    location: &str,
    value: &TokenValue,
    allowed: &[String],
    issues: &mut Vec<ValidationIssue>,
) {
    let text = value.to_string();
    if !allowed.iter().any(|a| *a == text) {
        issues.push(ValidationIssue::warning(
            location,
            format!("{text:?} is not one of the allowed values"),
        ));
    }
}
