//! Signal stores.
//!
//! Three backends:
//! - [`ChannelStore`]: forwards signals to an owning task over an mpsc channel
//! - [`RecordingStore`]: keeps every signal in memory, in order
//! - [`JsonStreamStore`]: writes newline-delimited JSON to any `Write` impl

pub mod json_stream;

pub use json_stream::JsonStreamStore;

use heimdall_core::Signal;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc;

/// Accepts signals emitted by the dispatcher.
pub trait Store: Send + Sync {
    fn dispatch(&self, signal: Signal);
}

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Sends each signal to whoever owns the receiving half.
///
/// ```ignore
/// let (store, mut rx) = ChannelStore::new();
/// tokio::spawn(async move {
///     while let Some(signal) = rx.recv().await {
///         state.apply(signal);
///     }
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ChannelStore {
    tx: mpsc::UnboundedSender<Signal>,
}

impl ChannelStore {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Store for ChannelStore {
    fn dispatch(&self, signal: Signal) {
        if let Err(e) = self.tx.send(signal) {
            tracing::warn!(signal = e.0.name(), "store receiver closed; signal dropped");
        }
    }
}

// ---------------------------------------------------------------------------
// Recording
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RecordingStore {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything dispatched so far.
    pub fn signals(&self) -> Vec<Signal> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a half-pushed Vec.
    fn lock(&self) -> MutexGuard<'_, Vec<Signal>> {
        self.signals.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Store for RecordingStore {
    fn dispatch(&self, signal: Signal) {
        self.lock().push(signal);
    }
}
