use std::collections::BTreeMap;

use tokensync_meta::{
    Brand, BrandPayload, ComponentEntry, ComponentTokenDef, Payload, SemanticEntry, Theme,
    ThemedSemantic, TokenGraph, TokenType, TokenValue, VALUE_SIZE_KEY,
};

use crate::config::DEFAULT_MISSING_COLOR;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::naming::{default_path, sized_path};

const TRANSPARENT: &str = "transparent";

/// A resolved payload plus everything that had to be papered over.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub payload: Payload,
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves tokens of one graph.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    graph: &'a TokenGraph,
    missing_color: String,
}

impl<'a> Resolver<'a> {
    pub fn new(graph: &'a TokenGraph) -> Self {
        Self {
            graph,
            missing_color: DEFAULT_MISSING_COLOR.to_string(),
        }
    }

    /// Use a different sentinel for unresolvable colors.
    pub fn with_missing_color(mut self, color: impl Into<String>) -> Self {
        self.missing_color = color.into();
        self
    }

    /// Resolve every brand.
    pub fn resolve(&self) -> Resolution {
        let mut diagnostics = Diagnostics::new();
        let brands = self
            .graph
            .brands
            .keys()
            .map(|id| (id.clone(), self.resolve_brand(id, &mut diagnostics)))
            .collect();

        tracing::info!(
            brands = self.graph.brands.len(),
            diagnostics = diagnostics.len(),
            "Resolved token graph"
        );

        Resolution {
            payload: Payload {
                global_primitives: self.graph.global_primitives.clone(),
                brands,
            },
            diagnostics: diagnostics.into_vec(),
        }
    }

    /// Resolve one brand. Unknown brands resolve to an empty payload.
    pub fn resolve_brand(&self, brand_id: &str, diagnostics: &mut Diagnostics) -> BrandPayload {
        let Some(brand) = self.graph.brands.get(brand_id) else {
            diagnostics.push(brand_id, "brand not found");
            return BrandPayload::default();
        };

        let mut semantic = ThemedSemantic::default();
        for theme in Theme::ALL {
            *semantic.get_mut(theme) = self.resolve_semantic(brand_id, theme, diagnostics);
        }

        BrandPayload {
            primitives: brand.primitives.clone(),
            semantic,
            components: self.flatten_component_tokens(brand_id, diagnostics),
        }
    }

    /// Resolve a semantic key to a hex color for one brand and theme.
    ///
    /// `None` means "no color" and yields `"transparent"`. Unmapped keys and
    /// unresolvable primitives yield the missing-color sentinel.
    pub fn resolve_color(&self, brand_id: &str, theme: Theme, semantic_key: Option<&str>) -> String {
        let Some(key) = semantic_key else {
            return TRANSPARENT.to_string();
        };
        self.lookup_color(brand_id, theme, key)
            .map(str::to_string)
            .unwrap_or_else(|| self.missing_color.clone())
    }

    fn lookup_color(&self, brand_id: &str, theme: Theme, key: &str) -> Option<&'a str> {
        let brand = self.graph.brands.get(brand_id)?;
        let reference = *brand.semantic_for(theme).get(key)?;
        brand
            .primitive(reference)
            .or_else(|| self.graph.global_primitive(reference))
    }

    /// Resolve a FLOAT or STRING token for one brand, optionally at a size.
    ///
    /// Lookup order: the brand's override for the size, the token's value for
    /// the size, the brand's override for [`VALUE_SIZE_KEY`], the token's
    /// single value. Returns `None` for unknown tokens and COLOR tokens.
    pub fn resolve_dimension(
        &self,
        brand_id: &str,
        token_name: &str,
        size: Option<&str>,
    ) -> Option<TokenValue> {
        let (_, def) = self.graph.find_token(token_name)?;
        if def.kind == TokenType::Color {
            return None;
        }
        let overrides = self
            .graph
            .brands
            .get(brand_id)
            .and_then(|b| b.dimension_overrides.get(token_name));

        if let Some(size) = size
            && let Some(value) = overrides.and_then(|o| o.get(size))
        {
            return Some(value.clone());
        }

        if let (Some(sizes), Some(size)) = (&def.sizes, size) {
            return sizes.get(size).cloned();
        }

        if let Some(value) = overrides.and_then(|o| o.get(VALUE_SIZE_KEY)) {
            return Some(value.clone());
        }
        def.value.clone()
    }

    /// Semantic tokens of one brand and theme, keyed by semantic key.
    pub fn resolve_semantic(
        &self,
        brand_id: &str,
        theme: Theme,
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<String, SemanticEntry> {
        let Some(brand) = self.graph.brands.get(brand_id) else {
            return BTreeMap::new();
        };

        brand
            .semantic_for(theme)
            .into_iter()
            .map(|(key, reference)| {
                let value = brand
                    .primitive(reference)
                    .or_else(|| self.graph.global_primitive(reference))
                    .map(str::to_string);
                if value.is_none() {
                    diagnostics.push(
                        format!("{brand_id}/{theme}/{key}"),
                        format!("primitive {reference} not found, using {}", self.missing_color),
                    );
                }
                let entry = SemanticEntry {
                    alias: reference.to_string(),
                    value: Some(value.unwrap_or_else(|| self.missing_color.clone())),
                };
                (key.to_string(), entry)
            })
            .collect()
    }

    /// Flatten every component token for one brand into store paths.
    ///
    /// Sized tokens produce one entry per size plus a `-default` entry
    /// pointing at the brand's default size; `aliasOf` tokens produce an
    /// entry pointing at the referenced token's path.
    pub fn flatten_component_tokens(
        &self,
        brand_id: &str,
        diagnostics: &mut Diagnostics,
    ) -> BTreeMap<String, ComponentEntry> {
        let mut out = BTreeMap::new();
        let Some(brand) = self.graph.brands.get(brand_id) else {
            return out;
        };

        for (component_name, component) in &self.graph.components {
            for (token_name, def) in &component.tokens {
                if let Some(target) = &def.alias_of {
                    self.flatten_alias(brand_id, brand, token_name, def, target, &mut out, diagnostics);
                    continue;
                }

                match def.kind {
                    TokenType::Color => {
                        out.insert(
                            def.target_path.clone(),
                            self.color_entry(brand_id, token_name, def, diagnostics),
                        );
                    }
                    TokenType::Float | TokenType::String if def.is_sized() => {
                        for size in self.graph.size_keys(component_name, def) {
                            let value = self.resolve_dimension(brand_id, token_name, Some(&size));
                            if value.is_none() {
                                diagnostics.push(
                                    sized_path(&def.target_path, &size),
                                    format!("{brand_id}: no value for size {size}"),
                                );
                            }
                            out.insert(
                                sized_path(&def.target_path, &size),
                                ComponentEntry::literal(def.kind, value),
                            );
                        }

                        if let Some(size) = default_size(brand, component_name, token_name) {
                            let sizes = self.graph.size_keys(component_name, def);
                            if !sizes.iter().any(|s| s == size) {
                                diagnostics.push(
                                    default_path(&def.target_path),
                                    format!("{brand_id}: default size {size} is not declared"),
                                );
                                continue;
                            }
                            out.insert(
                                default_path(&def.target_path),
                                ComponentEntry {
                                    kind: def.kind,
                                    value: self.resolve_dimension(brand_id, token_name, Some(size)),
                                    alias: None,
                                    alias_of: Some(sized_path(&def.target_path, size)),
                                },
                            );
                        }
                    }
                    TokenType::Float | TokenType::String => {
                        let value = self.resolve_dimension(brand_id, token_name, None);
                        if value.is_none() {
                            diagnostics.push(&def.target_path, format!("{brand_id}: no value"));
                        }
                        out.insert(def.target_path.clone(), ComponentEntry::literal(def.kind, value));
                    }
                }
            }
        }

        out
    }

    fn color_entry(
        &self,
        brand_id: &str,
        token_name: &str,
        def: &ComponentTokenDef,
        diagnostics: &mut Diagnostics,
    ) -> ComponentEntry {
        let Some(key) = def.semantic.as_deref() else {
            return ComponentEntry::literal(TokenType::Color, Some(TokenValue::from(TRANSPARENT)));
        };

        match self.lookup_color(brand_id, Theme::Light, key) {
            Some(hex) => ComponentEntry {
                kind: TokenType::Color,
                value: Some(TokenValue::from(hex)),
                alias: Some(key.to_string()),
                alias_of: None,
            },
            None => {
                diagnostics.push(
                    &def.target_path,
                    format!(
                        "{brand_id}: semantic {key:?} of {token_name} does not resolve, using {}",
                        self.missing_color
                    ),
                );
                ComponentEntry::literal(
                    TokenType::Color,
                    Some(TokenValue::from(self.missing_color.as_str())),
                )
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn flatten_alias(
        &self,
        brand_id: &str,
        brand: &Brand,
        token_name: &str,
        def: &ComponentTokenDef,
        target_name: &str,
        out: &mut BTreeMap<String, ComponentEntry>,
        diagnostics: &mut Diagnostics,
    ) {
        let Some((target_component, target)) = self.graph.find_token(target_name) else {
            diagnostics.push(&def.target_path, format!("aliasOf target {target_name:?} not found"));
            return;
        };
        if target_name == token_name || target.alias_of.is_some() {
            diagnostics.push(
                &def.target_path,
                format!("aliasOf target {target_name:?} is itself an alias"),
            );
            return;
        }
        if target.kind != def.kind {
            diagnostics.push(
                &def.target_path,
                format!("aliasOf target {target_name:?} is {}, not {}", target.kind, def.kind),
            );
            return;
        }

        let (path, value) = if target.is_sized() {
            let Some(size) = default_size(brand, target_component, target_name) else {
                diagnostics.push(
                    &def.target_path,
                    format!("{brand_id}: sized aliasOf target {target_name:?} has no default size"),
                );
                return;
            };
            (
                default_path(&target.target_path),
                self.resolve_dimension(brand_id, target_name, Some(size)),
            )
        } else if target.kind == TokenType::Color {
            let entry = self.color_entry(brand_id, target_name, target, diagnostics);
            (target.target_path.clone(), entry.value)
        } else {
            (
                target.target_path.clone(),
                self.resolve_dimension(brand_id, target_name, None),
            )
        };

        out.insert(
            def.target_path.clone(),
            ComponentEntry {
                kind: def.kind,
                value,
                alias: None,
                alias_of: Some(path),
            },
        );
    }
}

/// The brand's default size for a token, falling back to its component.
fn default_size<'b>(brand: &'b Brand, component_name: &str, token_name: &str) -> Option<&'b str> {
    brand
        .component_defaults
        .get(token_name)
        .or_else(|| brand.component_defaults.get(component_name))
        .map(String::as_str)
}
