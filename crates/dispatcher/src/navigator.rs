//! Location changes requested by the dispatcher.

use std::sync::Mutex;

/// Performs a location change. Fire-and-forget.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Remembers every requested location, oldest first.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    paths: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path, "navigate");
        self.paths
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(path.to_string());
    }
}
