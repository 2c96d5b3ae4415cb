use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// The single current status value shown above the log.
///
/// `Warning` is the soft-success variant (e.g. an identity call that
/// succeeded but returned an empty identifier) and must stay visually
/// distinct from `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Pending,
    Success(String),
    Warning(String),
    Error(String),
}

/// One immutable line of the ordered log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

struct Inner {
    entries: Vec<LogEntry>,
    status: Status,
}

/// Ordered, append-only record of timestamped entries plus one current
/// status value.
///
/// Both fields live under a single mutex so completions landing on
/// arbitrary worker threads can append concurrently while `snapshot`
/// always observes a consistent pair. Entry order is append order, which
/// under racing completions is not necessarily action-initiation order.
pub struct StatusLog {
    inner: Mutex<Inner>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: Vec::new(),
                status: Status::Idle,
            }),
        }
    }

    /// Timestamp and append one entry.
    pub fn append(&self, message: impl Into<String>) {
        let entry = LogEntry {
            at: Utc::now(),
            message: message.into(),
        };
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.push(entry);
        }
    }

    /// Atomic overwrite. Concurrent callers settle on whichever writer
    /// completes last in real time.
    pub fn set_status(&self, status: Status) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.status = status;
        }
    }

    /// Consistent read of entries and status as of one observation point.
    pub fn snapshot(&self) -> (Vec<LogEntry>, Status) {
        self.inner
            .lock()
            .map(|inner| (inner.entries.clone(), inner.status.clone()))
            .unwrap_or_else(|_| (Vec::new(), Status::Idle))
    }

    /// Clear the entries and return to `Idle`. In-flight calls are not
    /// affected; their eventual completions append to the cleared log.
    pub fn reset(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.entries.clear();
            inner.status = Status::Idle;
        }
    }
}

impl Default for StatusLog {
    fn default() -> Self {
        Self::new()
    }
}
