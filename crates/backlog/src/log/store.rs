use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::util::{lock_recovering, push_bounded};

use super::sink::{DebugMirror, FileLogWriter, LogWriter, TracingMirror};
use super::{LogEntry, Severity};

pub const DEFAULT_MAX_ENTRIES: usize = 500;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write log to {target}: {source}")]
    Write {
        target: String,
        #[source]
        source: io::Error,
    },
}

/// Bounded, thread-safe sequence of console log entries.
///
/// Producers on any thread call [`LogStore::append`]. The entries lock is held
/// only while the sequence is mutated or copied; the debug mirror, the durable
/// writer and every renderer run without it, so they are free to log back into
/// the store.
pub struct LogStore {
    entries: Mutex<VecDeque<LogEntry>>,
    capacity: usize,
    filter_level: AtomicU8,
    unseen: AtomicU8,
    refit_pending: AtomicBool,
    scroll_reset_pending: AtomicBool,
    mirror: Box<dyn DebugMirror>,
    writer: Option<Box<dyn LogWriter>>,
    // Serializes durable writes. Always taken before `entries`, never after.
    flush_lock: Mutex<()>,
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("filter_level", &self.filter_level())
            .field("unseen", &self.unseen_level())
            .field("has_writer", &self.writer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl LogStore {
    /// Store holding at most `capacity` entries (at least one), mirroring to
    /// `tracing` and without a durable writer.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            filter_level: AtomicU8::new(Severity::Default as u8),
            unseen: AtomicU8::new(Severity::None as u8),
            refit_pending: AtomicBool::new(false),
            scroll_reset_pending: AtomicBool::new(false),
            mirror: Box::new(TracingMirror),
            writer: None,
            flush_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self::new(config.max_entries)
            .with_filter_level(config.filter_level)
            .with_writer(Box::new(FileLogWriter::new(config.log_file_path())))
    }

    pub fn with_mirror(mut self, mirror: Box<dyn DebugMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    pub fn with_writer(mut self, writer: Box<dyn LogWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn with_filter_level(self, level: Severity) -> Self {
        self.set_filter_level(level);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        lock_recovering(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn filter_level(&self) -> Severity {
        Severity::from_u8(self.filter_level.load(Ordering::Relaxed))
    }

    /// Changes the admission threshold. Entries already stored are kept.
    pub fn set_filter_level(&self, level: Severity) {
        self.filter_level.store(level as u8, Ordering::Relaxed);
    }

    /// Admits `message` at `level` unless it is below the filter level.
    ///
    /// Error and Critical entries flush the whole buffer to the durable
    /// writer before returning.
    pub fn append(&self, message: impl AsRef<str>, level: Severity) {
        if level < self.filter_level() {
            return;
        }

        let entry = LogEntry::format(message.as_ref(), level);
        let mirrored = entry.text.clone();
        {
            let mut entries = lock_recovering(&self.entries, "append");
            push_bounded(&mut entries, entry, self.capacity);
        }

        self.refit_pending.store(true, Ordering::Release);
        self.mirror.emit(&mirrored, level);
        self.unseen.fetch_max(level as u8, Ordering::AcqRel);

        if level >= Severity::Error {
            self.flush_best_effort();
        }
    }

    /// Point-in-time copy of the entries. The lock is released before the copy
    /// is handed out.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        let entries = lock_recovering(&self.entries, "snapshot");
        entries.iter().cloned().collect()
    }

    pub fn concatenated_text(&self) -> String {
        let entries = lock_recovering(&self.entries, "concatenated_text");
        let total_len = entries.iter().map(|entry| entry.text.len()).sum();
        let mut text = String::with_capacity(total_len);
        for entry in entries.iter() {
            text.push_str(&entry.text);
        }
        text
    }

    /// Drops every entry and asks the owning console to reset its scroll.
    pub fn clear(&self) {
        lock_recovering(&self.entries, "clear").clear();
        self.scroll_reset_pending.store(true, Ordering::Release);
        self.refit_pending.store(true, Ordering::Release);
    }

    /// Highest severity appended since the watermark was last taken.
    pub fn unseen_level(&self) -> Severity {
        Severity::from_u8(self.unseen.load(Ordering::Acquire))
    }

    pub fn take_unseen_level(&self) -> Severity {
        Severity::from_u8(self.unseen.swap(Severity::None as u8, Ordering::AcqRel))
    }

    pub fn take_refit_pending(&self) -> bool {
        self.refit_pending.swap(false, Ordering::AcqRel)
    }

    pub fn take_scroll_reset(&self) -> bool {
        self.scroll_reset_pending.swap(false, Ordering::AcqRel)
    }

    /// Writes the full buffer through the durable writer, if one is set.
    pub fn flush(&self) -> Result<(), StoreError> {
        let Some(writer) = self.writer.as_deref() else {
            return Ok(());
        };

        let _flush_guard = lock_recovering(&self.flush_lock, "flush");
        let text = self.concatenated_text();
        writer.write_log(&text).map_err(|source| StoreError::Write {
            target: writer.describe(),
            source,
        })
    }

    /// Final flush on the way out. Failures are logged and swallowed.
    pub fn shutdown(&self) {
        self.flush_best_effort();
        debug!(entries = self.len(), "log_store_shutdown");
    }

    fn flush_best_effort(&self) {
        // Never re-enter `append` here: a failing disk must not feed the log.
        if let Err(error) = self.flush() {
            warn!(error = %error, "log_flush_failed");
        }
    }
}
