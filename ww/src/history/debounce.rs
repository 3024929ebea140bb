//! Trailing-edge debouncer over an injected clock
//!
//! Holds at most one pending value. A value is released once no newer value
//! has arrived for the whole window.

use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        debug!(window_ms = window.as_millis() as u64, "Debouncer::new: called");
        Self { window, pending: None }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Queue `value`, restarting the window
    ///
    /// A pending value whose window had already elapsed at `now` is returned
    /// so the caller can commit it before the new one.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        let expired = self.poll(now);
        self.pending = Some((value, now + self.window));
        expired
    }

    /// Release the pending value if its window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Release the pending value immediately
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    /// Drop the pending value
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            debug!("Debouncer::cancel: dropped pending value");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    /// When the pending value will be released
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[test]
    fn test_rapid_pushes_coalesce() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);

        assert_eq!(d.push(1, t0), None);
        assert_eq!(d.push(2, t0 + Duration::from_millis(200)), None);
        assert_eq!(d.push(3, t0 + Duration::from_millis(400)), None);

        // Window restarts on every push
        assert_eq!(d.poll(t0 + Duration::from_millis(800)), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(900)), Some(3));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_push_after_window_returns_expired_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);

        d.push("a", t0);
        assert_eq!(d.push("b", t0 + Duration::from_millis(600)), Some("a"));
        assert_eq!(d.pending(), Some(&"b"));
        assert_eq!(d.deadline(), Some(t0 + Duration::from_millis(1100)));
    }

    #[test]
    fn test_flush_and_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);

        d.push(1, t0);
        assert_eq!(d.flush(), Some(1));
        assert_eq!(d.flush(), None);

        d.push(2, t0);
        d.cancel();
        assert_eq!(d.poll(t0 + WINDOW), None);
    }
}
