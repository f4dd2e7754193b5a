//! Append-only diagnostic log for extraction runs.
//!
//! Entries are advisory: nothing reads them to make decisions. Each entry is
//! also emitted as a `tracing` debug event.

use std::collections::VecDeque;
use std::sync::Mutex;

use tracing::debug;

use crate::normalize::normalize_space;

/// Default number of retained entries.
pub const DEFAULT_CAPACITY: usize = 180;

/// Receiver for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    /// Record an event with optional details.
    fn record(&self, event: &str, details: &str);
}

/// Sink that only forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, event: &str, details: &str) {
        debug!(event, details, "diagnostic");
    }
}

/// Bounded ring buffer of `[HH:MM:SS] event | details` entries.
#[derive(Debug)]
pub struct DiagnosticLog {
    capacity: usize,
    entries: Mutex<VecDeque<String>>,
}

impl DiagnosticLog {
    /// Create a log keeping at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Snapshot of the retained entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing has been recorded since the last clear.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// All entries joined by newlines.
    pub fn render(&self) -> String {
        self.entries().join("\n")
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn record(&self, event: &str, details: &str) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        let event = match normalize_space(event) {
            e if e.is_empty() => "Debug event".to_string(),
            e => e,
        };
        let details = normalize_space(details);

        let entry = if details.is_empty() {
            format!("[{timestamp}] {event}")
        } else {
            format!("[{timestamp}] {event} | {details}")
        };
        debug!("{}", entry);

        let mut entries = self.lock();
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }
}
