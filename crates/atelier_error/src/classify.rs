//! Failure classification for backend calls.
//!
//! Every failed attempt against the generative backend lands in one of four
//! classes. The class decides whether the request manager retries, how long it
//! backs off, and which message the user eventually sees.

/// Outcome category of a failed backend attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ErrorClass {
    /// The backend rejected the call because a rate limit or quota was hit.
    #[display("quota exceeded")]
    QuotaExceeded,
    /// The selected API key is missing, invalid or points at nothing.
    #[display("invalid credential")]
    InvalidCredential,
    /// The backend is temporarily unavailable (503, 504).
    #[display("transient")]
    Transient,
    /// Anything else, surfaced unchanged.
    #[display("other")]
    Other,
}

/// Substrings the backend uses when the selected key cannot be resolved.
const CREDENTIAL_PATTERNS: &[&str] = &["requested entity was not found", "api key not found"];

/// Substrings that indicate a rate-limit rejection.
const QUOTA_PATTERNS: &[&str] = &["429", "resource_exhausted", "quota"];

impl ErrorClass {
    /// Classify a failure from its HTTP status (if any) and message.
    ///
    /// Credential patterns win over everything else, then quota signals, then
    /// the transient 503/504 statuses.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::ErrorClass;
    ///
    /// assert_eq!(ErrorClass::from_parts(Some(429), ""), ErrorClass::QuotaExceeded);
    /// assert_eq!(
    ///     ErrorClass::from_parts(None, "RESOURCE_EXHAUSTED: try later"),
    ///     ErrorClass::QuotaExceeded
    /// );
    /// assert_eq!(
    ///     ErrorClass::from_parts(Some(404), "Requested entity was not found."),
    ///     ErrorClass::InvalidCredential
    /// );
    /// assert_eq!(ErrorClass::from_parts(Some(504), "deadline"), ErrorClass::Transient);
    /// assert_eq!(ErrorClass::from_parts(Some(400), "bad prompt"), ErrorClass::Other);
    /// ```
    pub fn from_parts(status_code: Option<u16>, message: &str) -> Self {
        let message = message.to_lowercase();

        if CREDENTIAL_PATTERNS.iter().any(|p| message.contains(p)) {
            return ErrorClass::InvalidCredential;
        }

        if status_code == Some(429) || QUOTA_PATTERNS.iter().any(|p| message.contains(p)) {
            return ErrorClass::QuotaExceeded;
        }

        match status_code {
            Some(503 | 504) => ErrorClass::Transient,
            _ => ErrorClass::Other,
        }
    }

    /// Whether another attempt may succeed without user intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorClass::QuotaExceeded | ErrorClass::Transient)
    }

    /// Message to show the user for a failure of this class.
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorClass::QuotaExceeded => {
                "AI quota exceeded. Please wait a minute before trying again."
            }
            ErrorClass::InvalidCredential => "API key issue. Please re-select your key.",
            ErrorClass::Transient | ErrorClass::Other => {
                "The style lab is momentarily busy. Please try again."
            }
        }
    }
}

/// Errors that the request manager can classify and synthesize.
///
/// Units of work submitted to the manager fail with their own error type.
/// The manager inspects it through this trait and, when a failure is final,
/// may replace it with one of the canonical errors below.
pub trait ClassifiedError: Sized {
    /// HTTP status reported by the backend, if the failure carried one.
    fn status_code(&self) -> Option<u16>;

    /// Human-readable failure message used for pattern classification.
    fn message(&self) -> String;

    /// Classification of this failure.
    fn classify(&self) -> ErrorClass {
        ErrorClass::from_parts(self.status_code(), &self.message())
    }

    /// Error raised once a quota violation survives the retry budget.
    fn quota_exceeded() -> Self;

    /// Error raised when the backend rejects the credential.
    fn invalid_credential() -> Self;

    /// Error raised when the operation never produced an outcome.
    fn aborted(reason: impl Into<String>) -> Self;
}
