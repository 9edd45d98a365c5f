//! Error types for the Dripcam image generation pipeline.
//!
//! Each concern gets a `*ErrorKind` enum describing what went wrong and a
//! location-tracked error struct recording where it was raised. The
//! crate-level [`DripcamError`] wraps any of them.

mod config;
mod generation;
mod media;
mod storage;

pub use config::ConfigError;
pub use generation::{FailureClass, GenerationError, GenerationErrorKind};
pub use media::{MediaError, MediaErrorKind};
pub use storage::{StorageError, StorageErrorKind};

/// Crate-level error variants.
#[derive(Debug, derive_more::From, derive_more::Display)]
pub enum DripcamErrorKind {
    /// External generation provider error
    #[display("{}", _0)]
    Generation(GenerationError),
    /// Image record store error
    #[display("{}", _0)]
    Storage(StorageError),
    /// Media file error
    #[display("{}", _0)]
    Media(MediaError),
    /// Configuration error
    #[display("{}", _0)]
    Config(ConfigError),
}

/// Dripcam error with kind discrimination.
///
/// # Examples
///
/// ```
/// use dripcam_error::{DripcamError, StorageError, StorageErrorKind};
///
/// let err: DripcamError = StorageError::new(StorageErrorKind::NotFound(7)).into();
/// assert!(err.is_not_found());
/// ```
#[derive(Debug, derive_more::Display)]
#[display("Dripcam Error: {}", _0)]
pub struct DripcamError(Box<DripcamErrorKind>);

impl DripcamError {
    /// Create a new error from a kind.
    pub fn new(kind: DripcamErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DripcamErrorKind {
        &self.0
    }

    /// Location-free message, persisted on failed records and shown to operators.
    pub fn diagnostic(&self) -> String {
        match self.kind() {
            DripcamErrorKind::Generation(e) => e.diagnostic(),
            DripcamErrorKind::Storage(e) => e.kind.to_string(),
            DripcamErrorKind::Media(e) => e.kind.to_string(),
            DripcamErrorKind::Config(e) => e.message.clone(),
        }
    }

    /// True when the error reports an unknown image request id.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind(),
            DripcamErrorKind::Storage(StorageError {
                kind: StorageErrorKind::NotFound(_),
                ..
            })
        )
    }
}

impl std::error::Error for DripcamError {}

// Generic From implementation for any type that converts to DripcamErrorKind
impl<T> From<T> for DripcamError
where
    T: Into<DripcamErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Dripcam operations.
pub type DripcamResult<T> = std::result::Result<T, DripcamError>;
