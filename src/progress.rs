//! Reporting channel through which a scan publishes human-readable status messages.

use std::sync::Mutex;

/// Receives status messages while a scan is running.
///
/// Messages may arrive from several worker threads at once and in no particular order.
pub trait ProgressSink: Sync {
    /// Publish a status message.
    fn report(&self, message: &str);

    /// Announce the number of files that are about to be processed.
    fn begin(&self, _total: usize) {}

    /// Signal that one more file has been processed.
    fn advance(&self) {}

    /// Signal that processing has ended.
    fn finish(&self) {}
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

/// Discards every message.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn report(&self, _message: &str) {}
}

/// Keeps all messages in memory, e.g. for displaying them after the scan.
#[derive(Default)]
pub struct CollectingSink {
    messages: Mutex<Vec<String>>,
    processed: Mutex<usize>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|messages| messages.clone())
            .unwrap_or_default()
    }

    pub fn processed(&self) -> usize {
        self.processed.lock().map(|count| *count).unwrap_or(0)
    }

    /// Check whether any message contains the given text.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|message| message.contains(needle))
    }
}

impl ProgressSink for CollectingSink {
    fn report(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_owned());
        }
    }

    fn advance(&self) {
        if let Ok(mut count) = self.processed.lock() {
            *count += 1;
        }
    }
}
