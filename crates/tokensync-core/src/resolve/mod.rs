//! Token graph resolution
//!
//! Turns the editable [`TokenGraph`](tokensync_meta::TokenGraph) into the
//! flat per-brand [`Payload`](tokensync_meta::Payload) the sync engine
//! consumes. Resolution never fails: anything unresolvable is replaced by a
//! visible sentinel and reported as a [`Diagnostic`](crate::Diagnostic).

mod resolver;

pub use resolver::{Resolution, Resolver};
