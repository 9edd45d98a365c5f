//! Image generation provider errors.

/// Broad failure classes reported to users and operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum FailureClass {
    /// Network, timeout, or non-success HTTP response
    #[display("provider unavailable")]
    ProviderUnavailable,
    /// Provider answered successfully but returned no image
    #[display("provider declined")]
    ProviderDeclined,
    /// Client could not be configured
    #[display("configuration")]
    Configuration,
}

/// Generation provider error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenerationErrorKind {
    /// API key not configured
    MissingApiKey,
    /// Failed to build the HTTP client
    ClientCreation(String),
    /// Request could not be sent or the connection failed
    Unavailable(String),
    /// Request exceeded the configured timeout
    Timeout {
        /// Configured timeout in seconds
        seconds: u64,
    },
    /// Provider returned a non-success status code
    HttpStatus {
        /// HTTP status code
        status_code: u16,
        /// Response body or reason
        message: String,
    },
    /// Provider responded without an inline image, optionally explaining why
    Declined(Option<String>),
    /// Inline image payload was not valid base64
    InvalidImageData(String),
}

impl std::fmt::Display for GenerationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationErrorKind::MissingApiKey => {
                write!(f, "Gemini API key not configured (set GEMINI_API_KEY)")
            }
            GenerationErrorKind::ClientCreation(msg) => {
                write!(f, "Failed to create generation client: {}", msg)
            }
            GenerationErrorKind::Unavailable(msg) => {
                write!(f, "Image provider request failed: {}", msg)
            }
            GenerationErrorKind::Timeout { seconds } => {
                write!(f, "Image provider request timed out after {}s", seconds)
            }
            GenerationErrorKind::HttpStatus {
                status_code,
                message,
            } => write!(f, "Image provider returned HTTP {}: {}", status_code, message),
            GenerationErrorKind::Declined(Some(text)) => {
                write!(f, "Provider declined to generate an image: {}", text)
            }
            GenerationErrorKind::Declined(None) => {
                write!(f, "Provider declined to generate an image: no image data in response")
            }
            GenerationErrorKind::InvalidImageData(msg) => {
                write!(f, "Provider returned undecodable image data: {}", msg)
            }
        }
    }
}

impl GenerationErrorKind {
    /// Classify this error for reporting.
    pub fn class(&self) -> FailureClass {
        match self {
            GenerationErrorKind::MissingApiKey | GenerationErrorKind::ClientCreation(_) => {
                FailureClass::Configuration
            }
            GenerationErrorKind::Declined(_) | GenerationErrorKind::InvalidImageData(_) => {
                FailureClass::ProviderDeclined
            }
            GenerationErrorKind::Unavailable(_)
            | GenerationErrorKind::Timeout { .. }
            | GenerationErrorKind::HttpStatus { .. } => FailureClass::ProviderUnavailable,
        }
    }
}

/// Generation error with source location tracking.
///
/// # Examples
///
/// ```
/// use dripcam_error::{FailureClass, GenerationError, GenerationErrorKind};
///
/// let err = GenerationError::new(GenerationErrorKind::Timeout { seconds: 30 });
/// assert_eq!(err.kind.class(), FailureClass::ProviderUnavailable);
/// assert!(err.diagnostic().contains("timed out"));
/// ```
#[derive(Debug, Clone)]
pub struct GenerationError {
    /// The kind of error that occurred
    pub kind: GenerationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl GenerationError {
    /// Create a new GenerationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: GenerationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// User-facing diagnostic, persisted verbatim as the record's error message.
    pub fn diagnostic(&self) -> String {
        self.kind.to_string()
    }
}

impl std::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Generation Error: {} at line {} in {}",
            self.kind, self.line, self.file
        )
    }
}

impl std::error::Error for GenerationError {}
