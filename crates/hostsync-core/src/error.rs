//! Error types for hostsync
//!
//! This module defines all error types used throughout the workspace.
//! Every component returns these to its caller; nothing in the core retries.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for hostsync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hostsync
#[derive(Error, Debug)]
pub enum Error {
    /// A provider's backing file, URL, or database is unreachable or malformed
    #[error("Source unavailable ({provider}): {message}")]
    Source {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// The URL provider received a non-200 response
    #[error("Failed to fetch {url}: HTTP {status}")]
    HttpStatus {
        /// Requested URL
        url: String,
        /// Status line (e.g. "404 Not Found")
        status: String,
    },

    /// The hosts file could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The hosts file (or a snapshot) could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// File path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Entry data could not be parsed or serialized
    #[error("Parse error: {0}")]
    Parse(String),

    /// Git remote could not be reached
    #[error("Remote unreachable: {0}")]
    RemoteUnreachable(String),

    /// Git remote rejected our credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Git operation failed at a given stage
    #[error("Git {stage} failed: {message}")]
    Git {
        /// Synchronizer stage (clone, commit, push, ...)
        stage: String,
        /// Error message
        message: String,
    },

    /// The git working tree had nothing to commit
    #[error("nothing to commit")]
    NoChanges,

    /// Unknown provider or database kind
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    /// Invalid or incomplete configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Provider backing data unreachable or malformed
    SourceUnavailable,
    /// Local file read failed
    ReadFailure,
    /// Local file write failed
    WriteFailure,
    /// Git transport failure
    RemoteUnreachable,
    /// Git credentials rejected
    AuthFailure,
    /// Nothing to commit
    NoChanges,
    /// Unknown provider or database kind
    UnsupportedConfiguration,
    /// Missing or malformed configuration values
    InvalidConfiguration,
    /// Anything else
    Other,
}

impl Error {
    /// Create a source-unavailable error for the named provider
    pub fn source_unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a git stage error
    pub fn git(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Git {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Create a remote-unreachable error
    pub fn remote_unreachable(msg: impl Into<String>) -> Self {
        Self::RemoteUnreachable(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an unsupported-configuration error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Source { .. } | Self::HttpStatus { .. } | Self::Parse(_) => {
                ErrorKind::SourceUnavailable
            }
            Self::Read { .. } => ErrorKind::ReadFailure,
            Self::Write { .. } => ErrorKind::WriteFailure,
            Self::RemoteUnreachable(_) => ErrorKind::RemoteUnreachable,
            Self::Authentication(_) => ErrorKind::AuthFailure,
            Self::NoChanges => ErrorKind::NoChanges,
            Self::Unsupported(_) => ErrorKind::UnsupportedConfiguration,
            Self::Config(_) => ErrorKind::InvalidConfiguration,
            Self::Git { .. } => ErrorKind::Other,
        }
    }

    /// Returns `true` if the git synchronizer found nothing to commit.
    ///
    /// Callers usually treat this as a successful no-op rather than a failure.
    pub fn is_no_changes(&self) -> bool {
        matches!(self, Self::NoChanges)
    }

    /// Returns `true` if the underlying I/O error is `PermissionDenied`.
    ///
    /// Writing the system hosts file normally requires root.
    pub fn is_permission_denied(&self) -> bool {
        let io = match self {
            Self::Read { source, .. } | Self::Write { source, .. } => source,
            _ => return false,
        };
        io.kind() == std::io::ErrorKind::PermissionDenied
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
