// Playback scheduling for live consult speech.

use std::time::Duration;

use atelier_models::{PlaybackScheduler, PlaybackState, duration_of};

#[test]
fn test_chunks_are_gapless() {
    let mut scheduler = PlaybackScheduler::new();

    let a = scheduler.schedule(vec![0.0; 4_800], Duration::ZERO).unwrap();
    let b = scheduler.schedule(vec![0.0; 2_400], Duration::from_millis(10)).unwrap();
    let c = scheduler.schedule(vec![0.0; 2_400], Duration::from_millis(20)).unwrap();

    assert_eq!(*a.duration(), Duration::from_millis(200));
    assert_eq!(*b.start(), a.end());
    assert_eq!(*c.start(), b.end());
    assert_eq!(scheduler.next_time(), Duration::from_millis(400));
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_late_chunk_starts_now() {
    let mut scheduler = PlaybackScheduler::new();
    scheduler.schedule(vec![0.0; 2_400], Duration::ZERO);

    // The queue drained 100ms before this chunk arrived.
    let late = scheduler.schedule(vec![0.0; 2_400], Duration::from_millis(200)).unwrap();
    assert_eq!(*late.start(), Duration::from_millis(200));
}

#[test]
fn test_retire_forgets_finished_buffers() {
    let mut scheduler = PlaybackScheduler::new();
    scheduler.schedule(vec![0.0; 2_400], Duration::ZERO);
    scheduler.schedule(vec![0.0; 2_400], Duration::ZERO);

    scheduler.retire(Duration::from_millis(150));
    assert_eq!(scheduler.scheduled_count(), 1);

    scheduler.retire(Duration::from_millis(200));
    assert_eq!(scheduler.scheduled_count(), 0);
}

#[test]
fn test_interrupt_returns_dropped_ids_and_resets_timeline() {
    let mut scheduler = PlaybackScheduler::new();
    let a = scheduler.schedule(vec![0.0; 2_400], Duration::ZERO).unwrap();
    let b = scheduler.schedule(vec![0.0; 2_400], Duration::ZERO).unwrap();

    let dropped = scheduler.interrupt();
    assert_eq!(dropped, vec![*a.id(), *b.id()]);
    assert_eq!(scheduler.state(), PlaybackState::Interrupted);
    assert_eq!(scheduler.next_time(), Duration::ZERO);

    // Speech after a barge-in starts from the current clock again.
    let next = scheduler.schedule(vec![0.0; 2_400], Duration::from_millis(30)).unwrap();
    assert_eq!(*next.start(), Duration::from_millis(30));
    assert_eq!(scheduler.state(), PlaybackState::Streaming);
}

#[test]
fn test_stop_is_terminal() {
    let mut scheduler = PlaybackScheduler::new();
    scheduler.schedule(vec![0.0; 2_400], Duration::ZERO);
    scheduler.stop();

    assert_eq!(scheduler.state(), PlaybackState::Stopped);
    assert_eq!(scheduler.scheduled_count(), 0);
    assert!(scheduler.schedule(vec![0.0; 10], Duration::ZERO).is_none());
    assert!(scheduler.interrupt().is_empty());
    assert_eq!(scheduler.state(), PlaybackState::Stopped);
}

#[test]
fn test_custom_sample_rate() {
    let mut scheduler = PlaybackScheduler::with_sample_rate(16_000);
    let buffer = scheduler.schedule(vec![0.0; 16_000], Duration::ZERO).unwrap();
    assert_eq!(*buffer.duration(), duration_of(16_000, 16_000));
    assert_eq!(*buffer.duration(), Duration::from_secs(1));
}
