//! Top-level error wrapper types.

use crate::{ConfigError, GeminiError, IoError, JsonError, ThrottleError};
use crate::{ClassifiedError, ErrorClass};

/// Every error the workspace can surface.
///
/// # Examples
///
/// ```
/// use atelier_error::{AtelierError, JsonError};
///
/// let err: AtelierError = JsonError::new("expected an array").into();
/// assert!(format!("{}", err).contains("JSON Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AtelierErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Throttling configuration rejected
    #[from(ThrottleError)]
    Throttle(ThrottleError),
    /// Gemini backend error
    #[from(GeminiError)]
    Gemini(GeminiError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Local file error
    #[from(IoError)]
    Io(IoError),
}

/// Atelier error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Atelier Error: {}", _0)]
pub struct AtelierError(Box<AtelierErrorKind>);

impl AtelierError {
    /// Create a new error from a kind.
    pub fn new(kind: AtelierErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AtelierErrorKind {
        &self.0
    }

    /// Classification used to pick a user-facing message.
    ///
    /// Only backend failures are classified; local failures are `Other`.
    pub fn class(&self) -> ErrorClass {
        match self.kind() {
            AtelierErrorKind::Gemini(err) => err.classify(),
            _ => ErrorClass::Other,
        }
    }
}

impl<T> From<T> for AtelierError
where
    T: Into<AtelierErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Atelier operations.
pub type AtelierResult<T> = std::result::Result<T, AtelierError>;
