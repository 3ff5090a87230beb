//! Activity logging: the `ActivityLog` seam and its JSONL implementation.

use parking_lot::Mutex;

pub mod jsonl;

use jsonl::LogEntry;

/// Sink for validation activity events.
pub trait ActivityLog: Send + Sync {
    fn record(&self, entry: LogEntry);
}

/// In-memory sink, for embedding callers and tests that inspect events.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl ActivityLog for MemoryLog {
    fn record(&self, entry: LogEntry) {
        self.entries.lock().push(entry);
    }
}
