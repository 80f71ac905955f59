use std::time::{Duration, Instant};

/// Debounces "load older history" requests triggered by scrolling.
///
/// A visible range whose left edge comes within `edge` bars of the oldest
/// loaded bar schedules a request `cooldown` later. Further triggers before
/// the deadline push it back, so a burst of scroll events yields one
/// request. Time is passed in explicitly; the pager owns no clock.
#[derive(Clone, Debug)]
pub struct HistoryPager {
    cooldown: Duration,
    edge: f64,
    deadline: Option<Instant>,
}

impl HistoryPager {
    #[must_use]
    pub fn new(cooldown: Duration, edge: u32) -> Self {
        Self {
            cooldown,
            edge: f64::from(edge),
            deadline: None,
        }
    }

    /// Feeds the left edge of the visible logical range.
    ///
    /// Returns `true` when a request is now scheduled because of this call.
    /// A cooldown too long to represent past `now` schedules nothing.
    pub fn on_visible_range(&mut self, from: f64, now: Instant) -> bool {
        if from.is_nan() || from >= self.edge {
            return false;
        }

        let Some(deadline) = now.checked_add(self.cooldown) else {
            return false;
        };
        self.deadline = Some(deadline);
        true
    }

    /// Returns `true` exactly once when a scheduled request is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}
