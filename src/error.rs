//! Error taxonomy for dataset operations
//!
//! Backend failures are classified into a small set of kinds so callers (and
//! the get-or-create composite) can tell them apart without string matching.

use thiserror::Error;

/// Coarse classification of a [`BigqueryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    Unavailable,
    Internal,
}

/// Errors returned by the dataset client and its backends
#[derive(Error, Debug)]
pub enum BigqueryError {
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error("already exists: {message}")]
    AlreadyExists { message: String },

    #[error("permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("service unavailable: {message}")]
    Unavailable { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error("authentication failed: {0:#}")]
    Auth(anyhow::Error),
}

/// Convenience alias for results using `BigqueryError`.
pub type Result<T> = std::result::Result<T, BigqueryError>;

impl BigqueryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// The kind of failure, for matching without caring about the message
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::PermissionDenied { .. } | Self::Auth(_) => ErrorKind::PermissionDenied,
            Self::Unavailable { .. } => ErrorKind::Unavailable,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }
}
