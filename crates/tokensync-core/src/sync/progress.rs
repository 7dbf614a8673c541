//! Progress notifications
//!
//! Purely informational: a consumer may drop every event and still learn
//! the outcome from the returned [`SyncReport`](super::SyncReport).

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// An event emitted while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncEvent {
    #[serde(rename = "sync-progress")]
    Progress { message: String },
    #[serde(rename = "sync-complete")]
    Complete { success: bool, message: String },
}

/// Receiver of progress events.
pub trait Progress: Send + Sync {
    fn emit(&self, event: SyncEvent);

    fn message(&self, message: &str) {
        self.emit(SyncEvent::Progress {
            message: message.to_string(),
        });
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl Progress for NullProgress {
    fn emit(&self, _event: SyncEvent) {}
}

/// Forwards events to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn emit(&self, event: SyncEvent) {
        match event {
            SyncEvent::Progress { message } => tracing::info!("{message}"),
            SyncEvent::Complete { success: true, message } => tracing::info!("{message}"),
            SyncEvent::Complete { success: false, message } => tracing::error!("{message}"),
        }
    }
}

/// Sends events down an unbounded channel.
///
/// A closed receiver is ignored; nobody listening is not an error.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: UnboundedSender<SyncEvent>,
}

impl ChannelProgress {
    pub fn new(tx: UnboundedSender<SyncEvent>) -> Self {
        Self { tx }
    }

    /// A sink and the receiver draining it.
    pub fn channel() -> (Self, UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Progress for ChannelProgress {
    fn emit(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}
