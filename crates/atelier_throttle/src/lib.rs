//! Request throttling for the Gemini backend.
//!
//! Every backend call in the process goes through one [`RequestManager`]:
//! calls run one at a time in submission order, each waits out the cooldown
//! of its [`TrafficClass`], and failures are classified and retried under a
//! fixed-delay [`RetryPolicy`].
//!
//! # Example
//!
//! ```no_run
//! use atelier_throttle::{RequestManager, ThrottleConfig, TrafficClass};
//! use atelier_error::GeminiError;
//!
//! # async fn example() {
//! let manager = RequestManager::new(&ThrottleConfig::default());
//!
//! let reply: Result<String, GeminiError> = manager
//!     .enqueue(TrafficClass::Fast, || async { Ok("Try the camel coat.".to_string()) })
//!     .await;
//!
//! println!("next fast call in {}s", manager.wait_seconds(TrafficClass::Fast));
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod cooldown;
mod manager;
mod retry;
mod traffic;

pub use config::{
    AtelierConfig, ClassConfig, FAST_COOLDOWN_MS, HIGH_CAPABILITY_COOLDOWN_MS, MAX_ATTEMPTS,
    ModelCatalog, QUOTA_RESET_MS, ThrottleConfig, TRANSIENT_BACKOFF_MS,
};
pub use cooldown::CooldownTracker;
pub use manager::RequestManager;
pub use retry::RetryPolicy;
pub use traffic::TrafficClass;
