//! Unified application error types for DocVault.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested resource was not found, locally or in the remote tree.
    NotFound,
    /// A sibling folder with the same name already exists for the owner.
    DuplicateName,
    /// Authentication failed (invalid credentials, expired token, etc.).
    Authentication,
    /// The caller does not have permission to perform the action.
    Authorization,
    /// Input validation failed.
    Validation,
    /// A unique account attribute is already taken.
    Conflict,
    /// The remote provider throttled or briefly failed the request.
    RemoteTransient,
    /// The remote provider rejected the request permanently.
    RemoteFatal,
    /// A session with the remote provider could not be established.
    RemoteConnection,
    /// An internal server error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::DuplicateName => write!(f, "DUPLICATE_NAME"),
            Self::Authentication => write!(f, "AUTHENTICATION"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::RemoteTransient => write!(f, "REMOTE_TRANSIENT"),
            Self::RemoteFatal => write!(f, "REMOTE_FATAL"),
            Self::RemoteConnection => write!(f, "REMOTE_CONNECTION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified application error used throughout DocVault.
///
/// All crate-specific errors are mapped into `AppError` using `From` impls
/// or explicit `.map_err()` calls.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Structured detail, e.g. per-field validation messages.
    pub details: Option<serde_json::Value>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach structured details to this error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a duplicate-name error.
    pub fn duplicate_name(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DuplicateName, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authentication, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a validation error for a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorKind::Validation, format!("{field}: {message}"))
            .with_details(serde_json::json!({ field: [message] }))
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a transient remote error.
    pub fn remote_transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteTransient, message)
    }

    /// Create a fatal remote error.
    pub fn remote_fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteFatal, message)
    }

    /// Create a remote connection error.
    pub fn remote_connection(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteConnection, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Whether this error is a remote failure worth retrying.
    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::RemoteTransient
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_code() {
        let err = AppError::duplicate_name("Folder 'Reports' already exists");
        assert_eq!(
            err.to_string(),
            "DUPLICATE_NAME: Folder 'Reports' already exists"
        );
    }

    #[test]
    fn test_invalid_field_carries_details() {
        let err = AppError::invalid_field("name", "must not be empty");
        assert_eq!(err.kind, ErrorKind::Validation);
        let details = err.details.expect("details");
        assert_eq!(details["name"][0], "must not be empty");
    }

    #[test]
    fn test_only_remote_transient_is_transient() {
        assert!(AppError::remote_transient("429").is_transient());
        assert!(!AppError::remote_fatal("bad request").is_transient());
        assert!(!AppError::remote_connection("refused").is_transient());
    }

    #[test]
    fn test_clone_drops_source_keeps_details() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Internal, "wrapped", io)
            .with_details(serde_json::json!({"a": 1}));
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.details, err.details);
    }
}
