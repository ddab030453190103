//! Error types shared by every kvtable crate.
//!
//! ## Taxonomy
//!
//! - [`TableError::InvalidArgument`]: a value has no canonical representation
//!   (e.g. it marshals to JSON `null`) or an encoded key breaks the store's limits.
//! - [`TableError::Store`]: any backend failure other than "not found".
//! - [`TableError::Decode`]: a payload read back from the store is malformed.
//! - [`TableError::Serialization`]: a marshaller failed to convert a value.
//! - [`TableError::Unsupported`]: the operation is not offered by this view.
//!
//! "Not found" is never surfaced. [`StoreError::is_not_found`] lets the gateway
//! normalise it to `None` / `false` at the table boundary.

use std::fmt;

use thiserror::Error;

/// Error code emitted by the remote store for a missing resource.
pub const RESOURCE_NOT_FOUND: &str = "ResourceNotFound";

/// Alternate spelling of [`RESOURCE_NOT_FOUND`] emitted by some service versions.
pub const RESOURCE_NOT_FOUND_LEGACY: &str = "RESOURCE_NOT_FOUND";

/// Error code used when a request deadline expired before the store answered.
pub const OPERATION_TIMED_OUT: &str = "OperationTimedOut";

/// Failure reported by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    code: String,
    message: String,
}

impl StoreError {
    /// Creates a store error with the backend's error code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates the error a backend returns for a missing entity.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(RESOURCE_NOT_FOUND, message)
    }

    /// Creates the error a backend returns once a request deadline has passed.
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::new(OPERATION_TIMED_OUT, message)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true when the backend reported a missing resource.
    ///
    /// Both known spellings of the code are accepted.
    pub fn is_not_found(&self) -> bool {
        self.code == RESOURCE_NOT_FOUND || self.code == RESOURCE_NOT_FOUND_LEGACY
    }

    /// Returns true when the request deadline expired.
    pub fn is_timeout(&self) -> bool {
        self.code == OPERATION_TIMED_OUT
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for StoreError {}

/// Errors returned by table, view and marshalling operations.
#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl TableError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Returns the underlying store error, if this is one.
    pub fn as_store_error(&self) -> Option<&StoreError> {
        match self {
            TableError::Store(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias using [`TableError`].
pub type Result<T> = std::result::Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_spellings() {
        assert!(StoreError::new("ResourceNotFound", "gone").is_not_found());
        assert!(StoreError::new("RESOURCE_NOT_FOUND", "gone").is_not_found());
        assert!(!StoreError::new("AuthenticationFailed", "denied").is_not_found());
        assert!(!StoreError::new("resourcenotfound", "gone").is_not_found());
    }

    #[test]
    fn test_timeout_code() {
        let err = StoreError::timed_out("deadline passed");
        assert!(err.is_timeout());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_error_display() {
        let err = StoreError::new("ServerBusy", "try later");
        assert_eq!(err.to_string(), "[ServerBusy] try later");

        let err: TableError = err.into();
        assert_eq!(err.to_string(), "Store error: [ServerBusy] try later");
        assert_eq!(err.as_store_error().map(|e| e.code()), Some("ServerBusy"));

        let err = TableError::unsupported("row_key_set");
        assert_eq!(err.to_string(), "Unsupported operation: row_key_set");
        assert!(err.as_store_error().is_none());
    }
}
