//! Store reconciliation
//!
//! Brings a [`VariableStore`](crate::store::VariableStore) in line with a
//! resolved payload:
//!
//! - [`modes`]: fit each multi-mode collection's modes to the brand/theme
//!   plan with as little churn as possible
//! - [`variables`]: create, update, alias and prune variables phase by phase
//!
//! Both report recoverable problems as diagnostics and keep going.

pub mod modes;
pub mod variables;

pub use modes::{ModeBinding, ModePlan, plan_modes, reconcile_modes};
pub use variables::{Counters, SemanticOutcome, VariableReconciler};
