//! Variable store abstraction
//!
//! The engine talks to whatever holds the variables (a design tool, a file
//! on disk, an in-memory test double) only through [`VariableStore`]. The
//! contract mirrors what such hosts actually enforce:
//!
//! - a collection always keeps at least one mode
//! - a host may cap the number of modes per collection
//! - a value must match its variable's type
//! - an alias must point at an existing variable of the same type
//!
//! Every call is fallible on its own; the reconciler decides which failures
//! are tolerable.

mod file;
mod index;
mod memory;

pub use file::{FileStore, StoreDocument};
pub use index::{NameIndex, Named};
pub use memory::{FailPoint, MemoryStore, StoreState, StoreStats};

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokensync_meta::{Rgba, TokenType};

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

store_id!(
    /// Store-assigned collection identifier
    CollectionId
);
store_id!(
    /// Store-assigned mode identifier, unique across collections
    ModeId
);
store_id!(
    /// Store-assigned variable identifier
    VariableId
);

/// A named column of values within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub id: ModeId,
    pub name: String,
}

/// A named group of variables sharing one set of modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub modes: Vec<Mode>,
}

impl Collection {
    /// The first mode, which single-mode collections write to.
    pub fn default_mode(&self) -> Option<&Mode> {
        self.modes.first()
    }

    pub fn mode_named(&self, name: &str) -> Option<&Mode> {
        self.modes.iter().find(|m| m.name == name)
    }

    pub fn mode_names(&self) -> Vec<&str> {
        self.modes.iter().map(|m| m.name.as_str()).collect()
    }
}

/// A value held by a variable for one mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum VariableValue {
    Color(Rgba),
    Float(f64),
    String(String),
    Alias(VariableId),
}

impl VariableValue {
    /// Type of a literal; `None` for aliases, whose type is the target's.
    pub fn literal_kind(&self) -> Option<TokenType> {
        match self {
            Self::Color(_) => Some(TokenType::Color),
            Self::Float(_) => Some(TokenType::Float),
            Self::String(_) => Some(TokenType::String),
            Self::Alias(_) => None,
        }
    }

    pub fn alias_target(&self) -> Option<&VariableId> {
        match self {
            Self::Alias(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(color) => write!(f, "{color}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Alias(id) => write!(f, "-> {id}"),
        }
    }
}

/// A typed, named value with one entry per mode of its collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    pub id: VariableId,
    pub name: String,
    pub collection: CollectionId,
    pub kind: TokenType,
    #[serde(default)]
    pub values: BTreeMap<ModeId, VariableValue>,
}

/// Errors raised by a single store call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("Collection not found: {id}")]
    CollectionNotFound { id: CollectionId },

    #[error("Mode {mode} not found in collection {collection}")]
    ModeNotFound {
        collection: CollectionId,
        mode: ModeId,
    },

    #[error("Variable not found: {id}")]
    VariableNotFound { id: VariableId },

    #[error("Collection {collection} already has the maximum of {limit} modes")]
    ModeLimitReached {
        collection: CollectionId,
        limit: usize,
    },

    #[error("Cannot remove the last mode of collection {collection}")]
    LastMode { collection: CollectionId },

    #[error("Variable {variable} holds {expected} values, got {actual}")]
    TypeMismatch {
        variable: String,
        expected: TokenType,
        actual: TokenType,
    },

    #[error("Alias from {variable} points at missing variable {target}")]
    DanglingAlias {
        variable: String,
        target: VariableId,
    },

    #[error("{kind} {name:?} already exists in collection {collection}")]
    Duplicate {
        kind: &'static str,
        name: String,
        collection: CollectionId,
    },

    #[error("Store rejected {operation}: {reason}")]
    Rejected { operation: String, reason: String },

    #[error("Store I/O error: {message}")]
    Io { message: String },

    #[error("Store serialization error: {message}")]
    Serialize { message: String },

    #[error("Store is locked by another process: {message}")]
    Lock { message: String },
}

/// Metadata recorded when a run finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitInfo {
    /// Fingerprint of the payload, present only when the run succeeded
    pub payload_fingerprint: Option<String>,
}

/// The narrow interface the engine needs from a variable store.
#[async_trait]
pub trait VariableStore: Send + Sync {
    /// All collections, in creation order.
    async fn collections(&self) -> Result<Vec<Collection>, StoreError>;

    /// Create a collection holding one default mode.
    async fn create_collection(&self, name: &str) -> Result<Collection, StoreError>;

    /// Remove a collection together with its variables.
    async fn remove_collection(&self, id: &CollectionId) -> Result<(), StoreError>;

    async fn add_mode(&self, collection: &CollectionId, name: &str) -> Result<ModeId, StoreError>;

    async fn rename_mode(
        &self,
        collection: &CollectionId,
        mode: &ModeId,
        name: &str,
    ) -> Result<(), StoreError>;

    /// Remove a mode; fails on the last mode of a collection.
    async fn remove_mode(&self, collection: &CollectionId, mode: &ModeId)
    -> Result<(), StoreError>;

    /// Variables of one collection, in creation order.
    async fn variables(&self, collection: &CollectionId) -> Result<Vec<Variable>, StoreError>;

    async fn create_variable(
        &self,
        collection: &CollectionId,
        name: &str,
        kind: TokenType,
    ) -> Result<Variable, StoreError>;

    async fn set_value(
        &self,
        variable: &VariableId,
        mode: &ModeId,
        value: VariableValue,
    ) -> Result<(), StoreError>;

    async fn remove_variable(&self, id: &VariableId) -> Result<(), StoreError>;

    /// Persist whatever the run changed. Stores without durable state need
    /// not override this.
    async fn commit(&self, _info: &CommitInfo) -> Result<(), StoreError> {
        Ok(())
    }
}
