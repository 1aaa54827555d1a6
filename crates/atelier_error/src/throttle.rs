//! Throttling configuration errors.

/// Reasons a throttling configuration is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ThrottleErrorKind {
    /// The retry budget must allow at least one attempt
    #[display("max_attempts must be at least 1, got {}", _0)]
    NoAttempts(u32),
    /// A cooldown window of zero would disable spacing for a class
    #[display("cooldown for {} must be positive", _0)]
    ZeroCooldown(String),
    /// Backoff delays must be positive
    #[display("{} must be positive", _0)]
    ZeroDelay(String),
}

/// Throttling error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Throttle Error: {} at line {} in {}", kind, line, file)]
pub struct ThrottleError {
    /// The kind of error that occurred
    pub kind: ThrottleErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ThrottleError {
    /// Create a new ThrottleError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ThrottleErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
