//! Console remote provider
//!
//! Streaming integrations live outside the soundboard. The console build
//! only records what it would have asked a provider to play.

use sideline_core::{RemoteProvider, Result};
use std::sync::Mutex;
use tracing::info;

/// Remote provider that logs each delegated play
#[derive(Debug, Default)]
pub struct LoggingRemoteProvider {
    history: Mutex<Vec<(String, f64)>>,
}

impl LoggingRemoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// References delegated so far, oldest first
    pub fn history(&self) -> Vec<(String, f64)> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

impl RemoteProvider for LoggingRemoteProvider {
    fn play(&self, reference: &str, start_offset_seconds: f64) -> Result<()> {
        info!(reference, start_offset_seconds, "remote play requested");
        if let Ok(mut history) = self.history.lock() {
            history.push((reference.to_string(), start_offset_seconds));
        }
        Ok(())
    }
}
