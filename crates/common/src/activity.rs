//! User-facing activity log.
//!
//! Every operation reports its outcome here rather than through
//! interruptions. Entries are kept in insertion order; once the configured
//! capacity is reached the oldest entry is evicted. Each append is also
//! mirrored to `tracing` at the matching level.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Severity of an activity log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// One line of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Local wall-clock time (`HH:MM:SS`).
    pub timestamp: String,
    pub message: String,
    #[serde(rename = "type")]
    pub severity: Severity,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.timestamp, self.message)
    }
}

/// Append-only, bounded, ordered log.
#[derive(Debug, Clone)]
pub struct ActivityLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    evicted: u64,
}

impl ActivityLog {
    /// Create a log retaining at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(256)),
            capacity,
            evicted: 0,
        }
    }

    /// Append an entry stamped with the current local time.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> &LogEntry {
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.push_entry(LogEntry {
            timestamp,
            message: message.into(),
            severity,
        })
    }

    /// Append a fully formed entry.
    pub fn push_entry(&mut self, entry: LogEntry) -> &LogEntry {
        match entry.severity {
            Severity::Error => tracing::error!("{}", entry.message),
            Severity::Warning => tracing::warn!("{}", entry.message),
            Severity::Info | Severity::Success => tracing::info!("{}", entry.message),
        }

        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(entry);
        // Just pushed, never empty here.
        &self.entries[self.entries.len() - 1]
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries appended after the first `skip` retained ones.
    pub fn since(&self, skip: usize) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().skip(skip)
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
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

    /// Number of entries dropped to respect the capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Count of retained entries with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(crate::config::LoggingConfig::default().activity_capacity)
    }
}
