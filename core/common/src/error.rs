//! Common error types for DocVault.

use thiserror::Error;

/// Top-level error type for DocVault operations.
#[derive(Debug, Error)]
pub enum Error {
    /// No vault root has been set; every operation fails closed.
    #[error("Vault root is not set")]
    RootNotSet,

    /// A path failed containment or violated a root-protection rule.
    ///
    /// The message never carries resolved filesystem paths.
    #[error("Access denied: {0}")]
    SecurityRejection(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of an [`Error`], matching how callers react to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Path escaped the vault, root missing, or root protection triggered.
    SecurityRejection,
    /// The underlying filesystem call failed.
    NotFoundOrIo,
    /// Malformed caller input, rejected before any I/O.
    Validation,
}

impl Error {
    /// Classify this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::RootNotSet | Error::SecurityRejection(_) => ErrorCategory::SecurityRejection,
            Error::Io(_) | Error::NotFound(_) | Error::AlreadyExists(_) => {
                ErrorCategory::NotFoundOrIo
            }
            Error::InvalidInput(_) | Error::Serialization(_) => ErrorCategory::Validation,
        }
    }

    /// Whether this error is a security rejection.
    pub fn is_security_rejection(&self) -> bool {
        self.category() == ErrorCategory::SecurityRejection
    }

    /// Map an I/O error onto the taxonomy, keeping `NotFound` and
    /// `AlreadyExists` distinguishable for callers that surface a reason.
    pub fn from_io(err: std::io::Error, what: impl Into<String>) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(what.into()),
            std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(what.into()),
            _ => Error::Io(err),
        }
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(Error::RootNotSet.category(), ErrorCategory::SecurityRejection);
        assert_eq!(
            Error::SecurityRejection("outside vault".into()).category(),
            ErrorCategory::SecurityRejection
        );
        assert_eq!(
            Error::AlreadyExists("x".into()).category(),
            ErrorCategory::NotFoundOrIo
        );
        assert_eq!(
            Error::InvalidInput("empty name".into()).category(),
            ErrorCategory::Validation
        );
    }

    #[test]
    fn test_from_io_keeps_kind() {
        let err = Error::from_io(
            std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            "notes.md",
        );
        assert!(matches!(err, Error::AlreadyExists(ref name) if name == "notes.md"));

        let err = Error::from_io(std::io::Error::from(std::io::ErrorKind::NotFound), "gone");
        assert!(matches!(err, Error::NotFound(_)));

        let err = Error::from_io(
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            "locked",
        );
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_security_message_is_generic() {
        let err = Error::SecurityRejection("path is outside the vault".into());
        assert_eq!(err.to_string(), "Access denied: path is outside the vault");
        assert!(err.is_security_rejection());
    }
}
