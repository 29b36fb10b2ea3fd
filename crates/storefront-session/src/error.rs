//! # Design
//!
//! - Constant error messages; the failing operation and path live in fields.
//! - Source errors are preserved for callers that want the full chain.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors produced by the credential store and its storage backends.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A login was attempted with an empty credential.
    #[error("credential token is empty")]
    EmptyToken,
    /// Reading or writing the session file failed.
    #[error("session storage io failure")]
    Io {
        /// Storage operation that failed.
        operation: &'static str,
        /// Session file involved in the failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The session file did not contain a valid JSON object of strings.
    #[error("session storage json failure")]
    Json {
        /// Storage operation that failed.
        operation: &'static str,
        /// Session file involved in the failure.
        path: PathBuf,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
}

impl SessionError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: serde_json::Error,
    ) -> Self {
        Self::Json {
            operation,
            path: path.into(),
            source,
        }
    }
}
