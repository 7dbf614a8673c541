//! Shared test utilities for the tokensync workspace.
//!
//! This crate provides standardised fixtures so crate test suites agree on
//! what "a typical graph" looks like. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`fixtures`]: token graphs and payloads, from minimal to multi-brand
//! - [`project`]: [`TestProject`] builder for a project directory on disk

pub mod fixtures;
pub mod project;

pub use project::TestProject;
