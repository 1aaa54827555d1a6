//! Per-class cooldown windows.

use std::time::Duration;
use tokio::time::Instant;

use crate::TrafficClass;

/// Earliest instant each traffic class may dispatch again.
///
/// Pure state and time arithmetic: every method takes the current instant
/// from the caller, so the tracker never reads a clock itself.
///
/// # Example
///
/// ```
/// use atelier_throttle::{CooldownTracker, TrafficClass};
/// use std::time::Duration;
/// use tokio::time::Instant;
///
/// let start = Instant::now();
/// let mut tracker = CooldownTracker::new(Duration::from_secs(32), Duration::from_secs(5), start);
///
/// tracker.record_dispatch(TrafficClass::Fast, start);
/// assert_eq!(
///     tracker.time_until_available(TrafficClass::Fast, start + Duration::from_secs(2)),
///     Duration::from_secs(3)
/// );
/// assert_eq!(tracker.time_until_available(TrafficClass::HighCapability, start), Duration::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownTracker {
    high_capability_window: Duration,
    fast_window: Duration,
    high_capability_next: Instant,
    fast_next: Instant,
}

impl CooldownTracker {
    /// Create a tracker with both classes available from `start`.
    pub fn new(high_capability_window: Duration, fast_window: Duration, start: Instant) -> Self {
        Self {
            high_capability_window,
            fast_window,
            high_capability_next: start,
            fast_next: start,
        }
    }

    /// Cooldown window applied after each dispatch of `class`.
    pub fn window(&self, class: TrafficClass) -> Duration {
        match class {
            TrafficClass::HighCapability => self.high_capability_window,
            TrafficClass::Fast => self.fast_window,
        }
    }

    /// Earliest instant `class` may dispatch.
    pub fn next_available(&self, class: TrafficClass) -> Instant {
        match class {
            TrafficClass::HighCapability => self.high_capability_next,
            TrafficClass::Fast => self.fast_next,
        }
    }

    fn slot(&mut self, class: TrafficClass) -> &mut Instant {
        match class {
            TrafficClass::HighCapability => &mut self.high_capability_next,
            TrafficClass::Fast => &mut self.fast_next,
        }
    }

    /// Start a fresh window for `class` after an operation finished at `now`.
    ///
    /// Never moves the instant backwards, so a pending quota reset that
    /// reaches further than the window is kept.
    pub fn record_dispatch(&mut self, class: TrafficClass, now: Instant) {
        let candidate = now + self.window(class);
        let slot = self.slot(class);
        *slot = (*slot).max(candidate);
    }

    /// Push both classes to `now + reset_delay` after a quota violation.
    pub fn force_reset(&mut self, now: Instant, reset_delay: Duration) {
        let until = now + reset_delay;
        self.high_capability_next = until;
        self.fast_next = until;
    }

    /// Remaining cooldown for `class`, zero when it may dispatch now.
    pub fn time_until_available(&self, class: TrafficClass, now: Instant) -> Duration {
        self.next_available(class).saturating_duration_since(now)
    }
}
