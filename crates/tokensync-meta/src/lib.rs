//! Schema and document handling for tokensync.
//!
//! This crate owns the two data shapes the rest of the workspace trades in:
//!
//! - **Token graph** ([`TokenGraph`]): the editable hierarchy of shared
//!   primitives, per-brand primitives, semantic mappings and component token
//!   definitions.
//! - **Resolved payload** ([`Payload`]): the flattened per-brand snapshot the
//!   sync engine pushes into a variable store.
//!
//! It also provides the hex color codec, a format-agnostic loader and
//! non-fatal graph validation. Nothing here talks to a store.

pub mod color;
pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use color::{Rgba, is_hex_color};
pub use error::{Error, Result};
pub use loader::{DocumentFormat, Input, load_document, load_input, save_document};
pub use schema::{
    Brand, BrandPayload, ComponentDef, ComponentEntry, ComponentTokenDef, Palettes, Payload,
    PrimitiveRef, SemanticEntry, ThemedSemantic, Theme, TokenGraph, TokenType, TokenValue,
    VALUE_SIZE_KEY,
};
pub use validation::{Severity, ValidationIssue, validate_graph};
