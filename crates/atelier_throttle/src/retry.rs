//! Classified retry with fixed backoff.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use atelier_error::{ClassifiedError, ErrorClass};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::{CooldownTracker, ThrottleConfig};

/// Retry budget and the fixed delays used per failure class.
///
/// Credential failures never retry. Quota violations reset both cooldowns
/// and retry after the reset delay. Transient failures retry after a short
/// backoff. Anything else surfaces immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    quota_reset: Duration,
    transient_backoff: Duration,
}

impl RetryPolicy {
    /// Build a policy from explicit values.
    pub fn new(max_attempts: u32, quota_reset: Duration, transient_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            quota_reset,
            transient_backoff,
        }
    }

    /// Attempts per request, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds or the policy gives up.
    ///
    /// A quota violation calls [`CooldownTracker::force_reset`] on `tracker`
    /// at the moment it is observed, whether or not a retry follows.
    pub async fn run<T, E, F, Fut>(&self, tracker: &Mutex<CooldownTracker>, mut operation: F) -> Result<T, E>
    where
        E: ClassifiedError,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Request succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            let retries_left = attempt < self.max_attempts;
            match err.classify() {
                ErrorClass::InvalidCredential => {
                    warn!(attempt, "Backend rejected the credential, not retrying");
                    return Err(E::invalid_credential());
                }
                ErrorClass::QuotaExceeded => {
                    tracker
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .force_reset(Instant::now(), self.quota_reset);

                    if !retries_left {
                        warn!(attempt, "Quota still exceeded, giving up");
                        return Err(E::quota_exceeded());
                    }
                    warn!(
                        attempt,
                        reset_secs = self.quota_reset.as_secs(),
                        "Quota hit, forcing reset of both classes"
                    );
                    tokio::time::sleep(self.quota_reset).await;
                }
                ErrorClass::Transient if retries_left => {
                    warn!(
                        attempt,
                        status = ?err.status_code(),
                        backoff_ms = self.transient_backoff.as_millis() as u64,
                        "Backend temporarily unavailable, retrying"
                    );
                    tokio::time::sleep(self.transient_backoff).await;
                }
                class => {
                    debug!(attempt, %class, "Request failed");
                    return Err(err);
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&ThrottleConfig::default())
    }
}

impl From<&ThrottleConfig> for RetryPolicy {
    fn from(config: &ThrottleConfig) -> Self {
        Self::new(
            config.max_attempts,
            config.quota_reset(),
            config.transient_backoff(),
        )
    }
}
