use std::collections::VecDeque;
use std::sync::Mutex;

use crate::util::{lock_recovering, push_bounded};

pub const DEFAULT_MAX_HISTORY: usize = 500;

/// Previously submitted commands with a recall cursor.
///
/// Cursor 0 is the newest command; it counts backward toward the oldest.
#[derive(Debug)]
pub struct CommandHistory {
    inner: Mutex<HistoryInner>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct HistoryInner {
    commands: VecDeque<String>,
    cursor: usize,
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl CommandHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HistoryInner::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, command: impl Into<String>) {
        let mut inner = lock_recovering(&self.inner, "history_record");
        push_bounded(&mut inner.commands, command.into(), self.capacity);
        inner.cursor = 0;
    }

    /// Returns the command under the cursor, then steps toward older entries.
    /// Sticks at the oldest command.
    pub fn prev(&self) -> Option<String> {
        let mut inner = lock_recovering(&self.inner, "history_prev");
        let len = inner.commands.len();
        if len == 0 {
            return None;
        }

        let command = inner.commands[len - 1 - inner.cursor].clone();
        if inner.cursor < len - 1 {
            inner.cursor += 1;
        }
        Some(command)
    }

    /// Steps toward newer entries, then returns the command under the cursor.
    pub fn next(&self) -> Option<String> {
        let mut inner = lock_recovering(&self.inner, "history_next");
        let len = inner.commands.len();
        if len == 0 {
            return None;
        }

        inner.cursor = inner.cursor.saturating_sub(1);
        Some(inner.commands[len - 1 - inner.cursor].clone())
    }

    pub fn reset_cursor(&self) {
        lock_recovering(&self.inner, "history_reset").cursor = 0;
    }

    pub fn cursor(&self) -> usize {
        lock_recovering(&self.inner, "history_cursor").cursor
    }

    pub fn len(&self) -> usize {
        lock_recovering(&self.inner, "history_len").commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn commands(&self) -> Vec<String> {
        let inner = lock_recovering(&self.inner, "history_commands");
        inner.commands.iter().cloned().collect()
    }
}
