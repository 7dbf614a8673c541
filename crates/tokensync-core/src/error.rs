//! Error types for tokensync-core

use std::path::PathBuf;

use crate::store::StoreError;

/// Result type for tokensync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that terminate a sync run
///
/// Everything that can be recovered locally (a mode the store refuses, a
/// missing primitive, a single failed write) is reported as a
/// [`Diagnostic`](crate::Diagnostic) instead and never appears here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The payload names no brands
    #[error("No brands in payload")]
    NoBrands,

    /// The brand whose token set drives the component phase has no tokens
    #[error("No component tokens for reference brand {brand}")]
    NoComponentTokens { brand: String },

    /// Two brand ids map to the same mode and collection names
    #[error("Brands {first} and {second} share the display name {name}")]
    BrandNameCollision {
        first: String,
        second: String,
        name: String,
    },

    /// Mode reconciliation left no mode usable on every collection
    #[error("No modes could be created")]
    NoModes,

    /// `try_sync` was called while another run holds the engine
    #[error("A sync is already in progress")]
    SyncInProgress,

    /// Configuration file could not be parsed
    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// A store call whose failure leaves nothing to reconcile against
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Document loading error from tokensync-meta
    #[error(transparent)]
    Meta(#[from] tokensync_meta::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Payload errors are raised before the store is touched.
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            Self::NoBrands | Self::NoComponentTokens { .. } | Self::BrandNameCollision { .. }
        )
    }
}
