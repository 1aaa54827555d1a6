//! Error types for the Atelier wardrobe assistant.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum names the specific condition
//! - `*Error` struct wraps the kind with the source location that raised it
//! - constructors use `#[track_caller]` so the location is captured automatically
//!
//! Backend failures additionally carry a classification ([`ErrorClass`]) that
//! drives the retry policy of the request manager and the message shown to the
//! user.
//!
//! # Examples
//!
//! ```
//! use atelier_error::{AtelierResult, ConfigError};
//!
//! fn load() -> AtelierResult<()> {
//!     Err(ConfigError::new("missing [throttle] table"))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classify;
mod config;
mod error;
mod gemini;
mod io;
mod json;
mod throttle;

pub use classify::{ClassifiedError, ErrorClass};
pub use config::ConfigError;
pub use error::{AtelierError, AtelierErrorKind, AtelierResult};
pub use gemini::{GeminiError, GeminiErrorKind};
pub use io::IoError;
pub use json::JsonError;
pub use throttle::{ThrottleError, ThrottleErrorKind};
