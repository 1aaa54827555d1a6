//! Gemini backend error types.

use crate::{ClassifiedError, ErrorClass};

/// Gemini-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum GeminiErrorKind {
    /// API key not found in environment
    #[display("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    /// Failed to create the HTTP client
    #[display("Failed to create Gemini client: {}", _0)]
    ClientCreation(String),
    /// Request could not be sent or its body could not be read
    #[display("Gemini API request failed: {}", _0)]
    ApiRequest(String),
    /// Non-success HTTP reply
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message reported by the backend
        message: String,
    },
    /// Rate limit still hit after the retry budget was spent
    #[display("API rate limit exceeded. Please wait a moment.")]
    QuotaExceeded,
    /// Backend rejected the selected key
    #[display("API Key error. Please re-select your key.")]
    InvalidCredential,
    /// Operation ended without delivering an outcome
    #[display("Request aborted: {}", _0)]
    Aborted(String),
    /// Reply did not have the expected shape
    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
    /// Reply was well-formed but contained no generated media
    #[display("Generation failed: {}", _0)]
    GenerationFailed(String),
    /// Base64 decoding failed
    #[display("Base64 decode error: {}", _0)]
    Base64Decode(String),
    /// WebSocket connection failed
    #[display("WebSocket connection failed: {}", _0)]
    WebSocketConnection(String),
    /// WebSocket handshake failed (setup phase)
    #[display("WebSocket handshake failed: {}", _0)]
    WebSocketHandshake(String),
    /// Invalid message received from server
    #[display("Invalid server message: {}", _0)]
    InvalidServerMessage(String),
    /// Server sent goAway message
    #[display("Server disconnected: {}", _0)]
    ServerDisconnect(String),
    /// Stream was interrupted
    #[display("Stream interrupted: {}", _0)]
    StreamInterrupted(String),
    /// Voice session already stopped
    #[display("Session closed")]
    SessionClosed,
}

impl GeminiErrorKind {
    /// Classify this condition for the retry policy.
    pub fn class(&self) -> ErrorClass {
        match self {
            GeminiErrorKind::QuotaExceeded => ErrorClass::QuotaExceeded,
            GeminiErrorKind::InvalidCredential | GeminiErrorKind::MissingApiKey => {
                ErrorClass::InvalidCredential
            }
            GeminiErrorKind::HttpError {
                status_code,
                message,
            } => ErrorClass::from_parts(Some(*status_code), message),
            GeminiErrorKind::ApiRequest(message) => ErrorClass::from_parts(None, message),
            _ => ErrorClass::Other,
        }
    }

    /// Check if a WebSocket connection attempt failing with this error should be retried.
    pub fn is_retryable_connection(&self) -> bool {
        matches!(
            self,
            GeminiErrorKind::WebSocketConnection(_)
                | GeminiErrorKind::WebSocketHandshake(_)
                | GeminiErrorKind::StreamInterrupted(_)
        )
    }
}

/// Gemini error with source location tracking.
///
/// # Examples
///
/// ```
/// use atelier_error::{ClassifiedError, ErrorClass, GeminiError, GeminiErrorKind};
///
/// let err = GeminiError::new(GeminiErrorKind::HttpError {
///     status_code: 503,
///     message: "The model is overloaded.".to_string(),
/// });
/// assert_eq!(err.classify(), ErrorClass::Transient);
/// assert_eq!(err.status_code(), Some(503));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Gemini Error: {} at line {} in {}", kind, line, file)]
pub struct GeminiError {
    /// The kind of error that occurred
    pub kind: GeminiErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GeminiError {
    /// Create a new GeminiError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GeminiErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl ClassifiedError for GeminiError {
    fn status_code(&self) -> Option<u16> {
        match &self.kind {
            GeminiErrorKind::HttpError { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    // The kind alone; the location suffix of `Display` carries line numbers
    // that must not be mistaken for status codes.
    fn message(&self) -> String {
        self.kind.to_string()
    }

    fn classify(&self) -> ErrorClass {
        self.kind.class()
    }

    #[track_caller]
    fn quota_exceeded() -> Self {
        Self::new(GeminiErrorKind::QuotaExceeded)
    }

    #[track_caller]
    fn invalid_credential() -> Self {
        Self::new(GeminiErrorKind::InvalidCredential)
    }

    #[track_caller]
    fn aborted(reason: impl Into<String>) -> Self {
        Self::new(GeminiErrorKind::Aborted(reason.into()))
    }
}
