//! Linear undo/redo history with debounced recording

use std::time::{Duration, Instant};

use tracing::debug;

use super::Debouncer;

/// Undo/redo history over snapshots of `T`
///
/// `entries[index]` always equals the live value, except while an edit is
/// pending in the debounce window, when the live value may be ahead of it.
#[derive(Debug, Clone)]
pub struct EditHistoryManager<T> {
    entries: Vec<T>,
    index: usize,
    live: T,
    debouncer: Debouncer<T>,
}

impl<T: Clone> EditHistoryManager<T> {
    pub fn new(initial: T, window: Duration) -> Self {
        debug!(window_ms = window.as_millis() as u64, "EditHistoryManager::new: called");
        Self {
            entries: vec![initial.clone()],
            index: 0,
            live: initial,
            debouncer: Debouncer::new(window),
        }
    }

    /// The live value
    pub fn current(&self) -> &T {
        &self.live
    }

    /// Committed entry under the cursor
    pub fn committed(&self) -> &T {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of committed entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Update the live value; the history entry lands when the window elapses
    pub fn record(&mut self, state: T, now: Instant) {
        debug!(index = self.index, len = self.entries.len(), "record: called");
        self.live = state.clone();
        if let Some(expired) = self.debouncer.push(state, now) {
            self.commit(expired);
        }
    }

    /// Commit a pending edit whose window has elapsed
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.debouncer.poll(now) {
            Some(value) => {
                self.commit(value);
                true
            }
            None => false,
        }
    }

    /// Commit any pending edit now
    pub fn flush(&mut self) -> bool {
        match self.debouncer.flush() {
            Some(value) => {
                self.commit(value);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, value: T) {
        // New edits drop any redo future
        self.entries.truncate(self.index + 1);
        self.entries.push(value);
        self.index = self.entries.len() - 1;
        debug!(index = self.index, "commit: appended entry");
    }

    pub fn can_undo(&self) -> bool {
        self.index > 0 || self.is_pending()
    }

    pub fn can_redo(&self) -> bool {
        !self.is_pending() && self.index + 1 < self.entries.len()
    }

    /// Step back one entry, committing a pending edit first
    pub fn undo(&mut self) -> Option<&T> {
        self.flush();
        if self.index == 0 {
            debug!("undo: at oldest entry");
            return None;
        }
        self.index -= 1;
        self.live = self.entries[self.index].clone();
        debug!(index = self.index, "undo: moved cursor");
        Some(&self.live)
    }

    /// Step forward one entry
    pub fn redo(&mut self) -> Option<&T> {
        self.flush();
        if self.index + 1 >= self.entries.len() {
            debug!("redo: at newest entry");
            return None;
        }
        self.index += 1;
        self.live = self.entries[self.index].clone();
        debug!(index = self.index, "redo: moved cursor");
        Some(&self.live)
    }

    /// Forget everything and start over from `initial`
    pub fn reset(&mut self, initial: T) {
        debug!("reset: called");
        self.debouncer.cancel();
        self.entries = vec![initial.clone()];
        self.index = 0;
        self.live = initial;
    }
}
