//! Local file access errors.

/// Reading or writing a local file (image, wardrobe export, video) failed.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("IO Error: {} ({}) at line {} in {}", message, path, line, file)]
pub struct IoError {
    /// Underlying error message
    pub message: String,
    /// Path that was being accessed
    pub path: String,
    /// Line number where the error was raised
    pub line: u32,
    /// File where the error was raised
    pub file: &'static str,
}

impl IoError {
    /// Create an IO error for `path` at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use atelier_error::IoError;
    ///
    /// let err = IoError::new("wardrobe.json", "No such file or directory");
    /// assert_eq!(err.path, "wardrobe.json");
    /// ```
    #[track_caller]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            path: path.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
