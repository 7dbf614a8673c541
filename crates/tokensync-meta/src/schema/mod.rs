//! Document schemas
//!
//! - [`graph`]: the editable token graph (input to the resolver)
//! - [`payload`]: the resolved per-brand snapshot (input to the sync engine)
//! - [`types`]: scalar vocabulary shared by both

mod graph;
mod payload;
mod types;

pub use graph::{Brand, ComponentDef, ComponentTokenDef, Palettes, TokenGraph, VALUE_SIZE_KEY};
pub use payload::{BrandPayload, ComponentEntry, Payload, SemanticEntry, ThemedSemantic};
pub use types::{PrimitiveRef, Theme, TokenType, TokenValue};
