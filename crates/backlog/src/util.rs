use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use tracing::warn;

static LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_lock_poison_once(operation: &'static str) {
    if LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "backlog lock poisoned; recovered inner value");
    }
}

/// Locks `mutex`, recovering the guard if a previous holder panicked.
///
/// A panicking producer must not take the console down with it, so poison is
/// reported once and otherwise ignored.
pub(crate) fn lock_recovering<'a, T>(
    mutex: &'a Mutex<T>,
    operation: &'static str,
) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn_lock_poison_once(operation);
            poisoned.into_inner()
        }
    }
}

pub(crate) fn push_bounded<T>(queue: &mut VecDeque<T>, value: T, max_len: usize) {
    while queue.len() >= max_len && !queue.is_empty() {
        queue.pop_front();
    }
    queue.push_back(value);
}
