use std::time::{Duration, Instant};

/// Quiet period the window must hold before a resize is applied.
pub const RESIZE_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(50);

/// Trailing-edge debouncer driven by caller-supplied timestamps.
///
/// Scheduling replaces any pending value and restarts the quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    interval: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn schedule(&mut self, now: Instant, value: T) {
        self.pending = Some((now, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Releases the pending value once `interval` has elapsed since it was scheduled.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let (scheduled_at, _) = self.pending.as_ref()?;
        if now.saturating_duration_since(*scheduled_at) < self.interval {
            return None;
        }
        self.pending.take().map(|(_, value)| value)
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE_INTERVAL)
    }
}
