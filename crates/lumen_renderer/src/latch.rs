//! One-shot completion barrier.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// Blocks waiters until a fixed number of completions have been signalled.
///
/// Every `count_down` and the final wake-up go through the internal mutex,
/// so writes made before `count_down` are visible to a thread returning
/// from `wait`.
#[derive(Debug)]
pub struct Latch {
    remaining: Mutex<usize>,
    done: Condvar,
}

impl Latch {
    pub fn new(count: usize) -> Self {
        Self {
            remaining: Mutex::new(count),
            done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.remaining.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Signal one completion. Calls past zero are ignored.
    pub fn count_down(&self) {
        let mut remaining = self.lock();
        *remaining = remaining.saturating_sub(1);
        if *remaining == 0 {
            self.done.notify_all();
        }
    }

    /// Block until the count reaches zero.
    pub fn wait(&self) {
        let remaining = self.lock();
        let _released = self
            .done
            .wait_while(remaining, |remaining| *remaining > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Completions still outstanding.
    pub fn count(&self) -> usize {
        *self.lock()
    }
}
