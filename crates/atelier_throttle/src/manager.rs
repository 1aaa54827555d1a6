//! The serialized request lane.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use atelier_error::ClassifiedError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument};

use crate::{CooldownTracker, RetryPolicy, ThrottleConfig, TrafficClass};

type Work = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A submitted operation waiting for its turn in the lane.
struct LaneJob {
    class: TrafficClass,
    work: Work,
}

/// Process-wide gate in front of every backend call.
///
/// Operations run one at a time, in the order they were submitted, whatever
/// their traffic class. Before an operation runs, the manager waits out the
/// cooldown of its class; once it finishes (successfully or not) a fresh
/// window is started for that class.
///
/// Cloning is cheap and every clone feeds the same lane. Construct exactly
/// one per process and share it by handle.
///
/// # Panics
///
/// [`RequestManager::new`] spawns the lane worker and must be called from
/// within a tokio runtime.
#[derive(Debug, Clone)]
pub struct RequestManager {
    lane: mpsc::UnboundedSender<LaneJob>,
    tracker: Arc<Mutex<CooldownTracker>>,
    policy: RetryPolicy,
}

impl RequestManager {
    /// Create the manager and start its lane worker.
    pub fn new(config: &ThrottleConfig) -> Self {
        let tracker = CooldownTracker::new(
            config.high_capability.cooldown(),
            config.fast.cooldown(),
            Instant::now(),
        );
        Self::with_parts(tracker, RetryPolicy::from(config))
    }

    /// Create the manager from an existing tracker and policy.
    pub fn with_parts(tracker: CooldownTracker, policy: RetryPolicy) -> Self {
        let tracker = Arc::new(Mutex::new(tracker));
        let (lane, jobs) = mpsc::unbounded_channel();

        tokio::spawn(run_lane(jobs, Arc::clone(&tracker)));
        info!(
            max_attempts = policy.max_attempts(),
            "Request lane started"
        );

        Self {
            lane,
            tracker,
            policy,
        }
    }

    /// Submit `operation` to the lane.
    ///
    /// The operation is admitted behind everything submitted before this call
    /// returns, so the lane position is fixed before the returned future is
    /// first polled. Dropping the future does not cancel the operation.
    ///
    /// `operation` is invoked once per attempt.
    ///
    /// # Errors
    ///
    /// The future resolves to the operation's own error, or to one of the
    /// canonical errors of [`ClassifiedError`] when the retry policy gives up
    /// on a quota or credential failure, or when the operation panics.
    pub fn enqueue<T, E, F, Fut>(
        &self,
        class: TrafficClass,
        operation: F,
    ) -> impl Future<Output = Result<T, E>> + Send + 'static
    where
        T: Send + 'static,
        E: ClassifiedError + Send + 'static,
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (reply, outcome) = oneshot::channel();
        let tracker = Arc::clone(&self.tracker);
        let policy = self.policy;

        let work = async move {
            let wait = lock(&tracker).time_until_available(class, Instant::now());
            if !wait.is_zero() {
                info!(%class, wait_secs = wait.as_secs_f64(), "Waiting for cooldown window");
                tokio::time::sleep(wait).await;
            }

            debug!(%class, "Dispatching request");
            let result = policy.run(&tracker, operation).await;

            lock(&tracker).record_dispatch(class, Instant::now());
            if reply.send(result).is_err() {
                debug!(%class, "Caller went away before the result was ready");
            }
        };

        let admitted = self
            .lane
            .send(LaneJob {
                class,
                work: Box::pin(work),
            })
            .is_ok();

        async move {
            if !admitted {
                return Err(E::aborted("request lane is closed"));
            }
            match outcome.await {
                Ok(result) => result,
                Err(_) => Err(E::aborted("operation ended without a result")),
            }
        }
    }

    /// Remaining cooldown for `class`; zero when it may dispatch now.
    ///
    /// Read-only and cheap enough to poll every second for a countdown.
    pub fn time_until_available(&self, class: TrafficClass) -> Duration {
        lock(&self.tracker).time_until_available(class, Instant::now())
    }

    /// Remaining cooldown for `class`, rounded up to whole seconds.
    pub fn wait_seconds(&self, class: TrafficClass) -> u64 {
        let remaining = self.time_until_available(class);
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }
}

fn lock(tracker: &Mutex<CooldownTracker>) -> MutexGuard<'_, CooldownTracker> {
    tracker.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drain the lane, one job at a time.
///
/// Each job runs in its own task so a panic only loses that job's result.
#[instrument(skip_all)]
async fn run_lane(mut jobs: mpsc::UnboundedReceiver<LaneJob>, tracker: Arc<Mutex<CooldownTracker>>) {
    while let Some(LaneJob { class, work }) = jobs.recv().await {
        if let Err(e) = tokio::spawn(work).await {
            error!(%class, error = %e, "Request task failed");
            lock(&tracker).record_dispatch(class, Instant::now());
        }
    }
    debug!("Request lane closed");
}
