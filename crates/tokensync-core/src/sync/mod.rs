//! SyncEngine for pushing resolved payloads into a variable store
//!
//! This module provides:
//! - **engine**: the run loop, guarded so only one run touches a store at a time
//! - **progress**: informational notifications while a run is in flight
//! - **report**: the authoritative outcome of a run

mod engine;
mod progress;
mod report;

pub use engine::SyncEngine;
pub use progress::{ChannelProgress, LogProgress, NullProgress, Progress, SyncEvent};
pub use report::SyncReport;
