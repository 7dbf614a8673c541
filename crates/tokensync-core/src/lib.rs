//! Token resolution and variable store reconciliation for tokensync
//!
//! This crate turns a token graph into the state of a variable store:
//!
//! - **Resolution** ([`Resolver`]): flatten brands, themes and component
//!   tokens into a [`Payload`](tokensync_meta::Payload)
//! - **Store boundary** ([`VariableStore`]): the narrow async interface the
//!   engine drives, with in-memory and JSON-file implementations
//! - **Reconciliation** ([`reconcile`]): mode fitting and phase-ordered
//!   variable updates that keep aliases valid at every step
//! - **SyncEngine**: one guarded run at a time, reporting everything it
//!   could not do instead of stopping
//!
//! # Architecture
//!
//! ```text
//!  TokenGraph --Resolver--> Payload --SyncEngine--> VariableStore
//!                                          |
//!                                 reconcile::{modes, variables}
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tokensync_core::{MemoryStore, NullProgress, SyncConfig, SyncEngine};
//!
//! let engine = SyncEngine::new(Arc::new(MemoryStore::new()), SyncConfig::default());
//! let report = engine.sync_graph(&graph, &NullProgress).await?;
//! println!("{}", report.summary());
//! ```

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod naming;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod sync;

pub use config::{CollectionNames, ConfigResolver, SyncConfig};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use error::{Error, Result};
pub use reconcile::{ModeBinding, ModePlan, plan_modes, reconcile_modes};
pub use resolve::{Resolution, Resolver};
pub use store::{
    Collection, CollectionId, CommitInfo, FailPoint, FileStore, MemoryStore, Mode, ModeId,
    NameIndex, StoreDocument, StoreError, StoreState, StoreStats, Variable, VariableId,
    VariableStore, VariableValue,
};
pub use sync::{
    ChannelProgress, LogProgress, NullProgress, Progress, SyncEngine, SyncEvent, SyncReport,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_errors_are_flagged() {
        assert!(Error::NoBrands.is_payload_error());
        assert!(
            Error::NoComponentTokens {
                brand: "acme".into()
            }
            .is_payload_error()
        );
        assert!(
            Error::BrandNameCollision {
                first: "Acme".into(),
                second: "acme".into(),
                name: "Acme".into(),
            }
            .is_payload_error()
        );
        assert!(!Error::NoModes.is_payload_error());
    }

    #[test]
    fn store_errors_display_through() {
        let error = Error::from(StoreError::LastMode {
            collection: CollectionId::from("collection:1"),
        });
        assert!(error.to_string().contains("collection:1"));
    }
}
