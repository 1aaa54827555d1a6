//! Gapless scheduling of streamed speech.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, trace};

use crate::audio::{OUTPUT_SAMPLE_RATE, duration_of};

/// Lifecycle of the playback queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum PlaybackState {
    /// Nothing scheduled yet
    Idle,
    /// Buffers are queued back to back
    Streaming,
    /// The user barged in; queued buffers were dropped
    Interrupted,
    /// Session over; nothing more will be scheduled
    Stopped,
}

/// A decoded chunk placed on the output timeline.
#[derive(Debug, Clone, PartialEq, derive_getters::Getters)]
pub struct ScheduledBuffer {
    /// Identifier, unique within a scheduler
    id: u64,
    /// Offset on the output clock at which playback starts
    start: Duration,
    /// Playback length
    duration: Duration,
    /// Mono samples in `[-1.0, 1.0]`
    samples: Vec<f32>,
}

impl ScheduledBuffer {
    /// Offset on the output clock at which playback ends.
    pub fn end(&self) -> Duration {
        self.start + self.duration
    }
}

/// Places incoming speech chunks back to back on the output clock.
///
/// Each chunk starts where the previous one ends, or now if the queue has
/// drained. An interruption drops everything queued and restarts the
/// timeline; stopping is terminal.
///
/// # Example
///
/// ```
/// use atelier_models::{PlaybackScheduler, PlaybackState};
/// use std::time::Duration;
///
/// let mut scheduler = PlaybackScheduler::new();
/// let first = scheduler.schedule(vec![0.0; 12_000], Duration::ZERO).unwrap();
/// let second = scheduler.schedule(vec![0.0; 12_000], Duration::from_millis(100)).unwrap();
///
/// assert_eq!(*second.start(), first.end());
/// assert_eq!(scheduler.state(), PlaybackState::Streaming);
/// ```
#[derive(Debug, Clone)]
pub struct PlaybackScheduler {
    sample_rate: u32,
    next_time: Duration,
    next_id: u64,
    // id -> end offset
    scheduled: BTreeMap<u64, Duration>,
    state: PlaybackState,
}

impl PlaybackScheduler {
    /// Scheduler for model speech at 24 kHz.
    pub fn new() -> Self {
        Self::with_sample_rate(OUTPUT_SAMPLE_RATE)
    }

    /// Scheduler for a different sample rate.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            next_time: Duration::ZERO,
            next_id: 0,
            scheduled: BTreeMap::new(),
            state: PlaybackState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Where the next buffer would start if the clock were at zero.
    pub fn next_time(&self) -> Duration {
        self.next_time
    }

    /// Number of buffers queued or playing.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    /// Queue `samples`, starting at `max(next_time, now)`.
    ///
    /// Returns `None` once the scheduler is stopped.
    pub fn schedule(&mut self, samples: Vec<f32>, now: Duration) -> Option<ScheduledBuffer> {
        if self.state == PlaybackState::Stopped {
            trace!("Dropping audio after stop");
            return None;
        }

        let start = self.next_time.max(now);
        let duration = duration_of(samples.len(), self.sample_rate);
        self.next_time = start + duration;

        let id = self.next_id;
        self.next_id += 1;
        self.scheduled.insert(id, self.next_time);
        self.state = PlaybackState::Streaming;

        trace!(id, ?start, ?duration, "Scheduled playback buffer");
        Some(ScheduledBuffer {
            id,
            start,
            duration,
            samples,
        })
    }

    /// Forget buffers that finished playing by `now`.
    pub fn retire(&mut self, now: Duration) {
        self.scheduled.retain(|_, end| *end > now);
    }

    /// Drop every queued buffer and restart the timeline.
    ///
    /// Returns the ids of the dropped buffers so the caller can silence them.
    pub fn interrupt(&mut self) -> Vec<u64> {
        if self.state == PlaybackState::Stopped {
            return Vec::new();
        }

        let dropped: Vec<u64> = std::mem::take(&mut self.scheduled).into_keys().collect();
        self.next_time = Duration::ZERO;
        self.state = PlaybackState::Interrupted;
        debug!(dropped = dropped.len(), "Playback interrupted");
        dropped
    }

    /// Drop everything and refuse further buffers.
    pub fn stop(&mut self) {
        self.scheduled.clear();
        self.next_time = Duration::ZERO;
        self.state = PlaybackState::Stopped;
    }
}

impl Default for PlaybackScheduler {
    fn default() -> Self {
        Self::new()
    }
}
