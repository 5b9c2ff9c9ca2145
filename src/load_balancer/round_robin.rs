//! Round-robin rotation with liveness skipping.

use std::sync::{Mutex, PoisonError};

/// Round-robin selector.
/// Stores the rotation cursor; the effective index is always `cursor % len`.
#[derive(Debug, Default)]
pub struct RoundRobin {
    cursor: Mutex<u64>,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan forward from the cursor for the first slot accepted by `is_alive`.
    ///
    /// Every visited slot advances the cursor by one, including the one returned.
    /// The scan visits at most `items.len()` slots and returns `None` if none of
    /// them is alive (or `items` is empty). Cursor read, scan and advance happen
    /// under one lock.
    pub fn select<T, F>(&self, items: &[T], is_alive: F) -> Option<usize>
    where
        F: Fn(&T) -> bool,
    {
        let len = items.len();
        if len == 0 {
            return None;
        }

        // The counter is a plain integer; a panic elsewhere cannot leave it torn.
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..len {
            let index = (*cursor % len as u64) as usize;
            *cursor = cursor.wrapping_add(1);
            if is_alive(&items[index]) {
                return Some(index);
            }
        }
        None
    }

    /// Current cursor value.
    pub fn cursor(&self) -> u64 {
        *self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
