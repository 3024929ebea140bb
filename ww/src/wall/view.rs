//! Wall browsing state: filter, revealed originals, delete confirmation

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::domain::{WallFilter, WallPost};

/// How long an armed delete waits for its confirmation
pub const DELETE_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

/// Outcome of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteRequest {
    /// First press; a second press within the window confirms
    Armed,
    /// Second press in time; the caller should delete now
    Confirmed,
}

#[derive(Debug, Clone, Default)]
pub struct WallView {
    filter: WallFilter,
    revealed: HashSet<String>,
    armed: Option<(String, Instant)>,
}

impl WallView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> WallFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: WallFilter) {
        debug!(%filter, "set_filter: called");
        self.filter = filter;
    }

    /// Posts passing the current filter, in wall order
    pub fn visible<'a>(&self, posts: &'a [WallPost]) -> Vec<&'a WallPost> {
        posts.iter().filter(|p| self.filter.matches(p)).collect()
    }

    /// Flip whether the original text of `id` is shown; returns the new state
    pub fn toggle_reveal(&mut self, id: &str) -> bool {
        let revealed = if self.revealed.remove(id) {
            false
        } else {
            self.revealed.insert(id.to_string());
            true
        };
        debug!(%id, %revealed, "toggle_reveal: called");
        revealed
    }

    pub fn is_revealed(&self, id: &str) -> bool {
        self.revealed.contains(id)
    }

    /// Two-step delete: arm on the first press, confirm on a second press
    /// for the same post before the window expires
    pub fn request_delete(&mut self, id: &str, now: Instant) -> DeleteRequest {
        let confirmed = matches!(
            &self.armed,
            Some((armed_id, at)) if armed_id == id && now.duration_since(*at) < DELETE_CONFIRM_WINDOW
        );

        if confirmed {
            debug!(%id, "request_delete: confirmed");
            self.armed = None;
            self.revealed.remove(id);
            DeleteRequest::Confirmed
        } else {
            debug!(%id, "request_delete: armed");
            self.armed = Some((id.to_string(), now));
            DeleteRequest::Armed
        }
    }

    /// Post currently waiting for delete confirmation
    pub fn armed(&self, now: Instant) -> Option<&str> {
        self.armed
            .as_ref()
            .filter(|(_, at)| now.duration_since(*at) < DELETE_CONFIRM_WINDOW)
            .map(|(id, _)| id.as_str())
    }

    pub fn disarm(&mut self) {
        self.armed = None;
    }
}
