//! Capacity-bounded audit trail of engine events.
//!
//! Every emitted event is kept verbatim; there is no deduplication or
//! filtering. Once the log holds `capacity` entries, each append drops the
//! oldest one.

use std::collections::VecDeque;

use crate::limits::LOG_CAPACITY;
use crate::types::{LogEntry, LogKind};

/// Ordered, append-only event log.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    /// Next id to hand out. Monotonic, so ids never repeat within the buffer.
    next_id: u64,
}

impl EventLog {
    /// Create a log holding up to `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_id: 1,
        }
    }

    /// Append an entry stamped with the current local wall-clock time.
    pub fn append(&mut self, kind: LogKind, message: impl Into<String>) -> LogEntry {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.append_at(kind, message, timestamp)
    }

    /// Append an entry with an explicit `HH:MM:SS` timestamp.
    pub fn append_at(
        &mut self,
        kind: LogKind,
        message: impl Into<String>,
        timestamp: String,
    ) -> LogEntry {
        let entry = LogEntry {
            id: self.next_id,
            timestamp,
            kind,
            message: message.into(),
        };
        self.next_id += 1;

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry.clone());
        entry
    }

    /// The last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> Vec<String> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries
            .iter()
            .skip(skip)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate oldest → newest.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Copy the entries out, oldest → newest.
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(LOG_CAPACITY)
    }
}
