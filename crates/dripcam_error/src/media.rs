//! Media file error types.

/// Kinds of media store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum MediaErrorKind {
    /// No file at the relative path
    #[display("Media not found: {}", _0)]
    NotFound(String),
    /// Path escapes the media root or is otherwise unusable
    #[display("Invalid media path: {}", _0)]
    InvalidPath(String),
    /// I/O error while reading or writing
    #[display("I/O error: {}", _0)]
    Io(String),
}

/// Media error with location tracking.
///
/// # Examples
///
/// ```
/// use dripcam_error::{MediaError, MediaErrorKind};
///
/// let err = MediaError::new(MediaErrorKind::NotFound("webcam/a.jpg".to_string()));
/// assert!(format!("{}", err).contains("webcam/a.jpg"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Media Error: {} at line {} in {}", kind, line, file)]
pub struct MediaError {
    /// The kind of error that occurred
    pub kind: MediaErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl MediaError {
    /// Create a new media error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: MediaErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
