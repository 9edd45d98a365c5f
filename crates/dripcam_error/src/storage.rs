//! Image record store error types.

/// Kinds of record store errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StorageErrorKind {
    /// No image request with this id
    #[display("Image request {} not found", _0)]
    NotFound(i64),
    /// Conditional update rejected because the record is in another state
    #[display("Image request {} is {} (update guard not satisfied)", id, current)]
    Conflict {
        /// Record id
        id: i64,
        /// Status the record was actually in
        current: String,
    },
    /// Update would violate a record invariant
    #[display("Invalid update: {}", _0)]
    InvalidUpdate(String),
    /// Backend connection failed
    #[display("Store connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Store query error: {}", _0)]
    Query(String),
    /// Row could not be mapped to a record
    #[display("Serialization error: {}", _0)]
    Serialization(String),
    /// Schema migration failed
    #[display("Migration error: {}", _0)]
    Migration(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use dripcam_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound(42));
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// True when a conditional update was rejected by its guard.
    pub fn is_conflict(&self) -> bool {
        matches!(self.kind, StorageErrorKind::Conflict { .. })
    }
}

// Diesel error conversions (only available with database feature)
#[cfg(feature = "database")]
impl From<diesel::result::Error> for StorageError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        StorageError::new(StorageErrorKind::Query(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for StorageError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        StorageError::new(StorageErrorKind::Connection(err.to_string()))
    }
}

#[cfg(feature = "database")]
impl From<serde_json::Error> for StorageError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        StorageError::new(StorageErrorKind::Serialization(err.to_string()))
    }
}
