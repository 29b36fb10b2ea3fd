#![forbid(unsafe_code)]
#![deny(
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Shared HTTP DTOs for the storefront REST backend.
//!
//! These types are shared by the session store, the HTTP client and the CLI so
//! the wire contract lives in one place. The backend schema is not owned by
//! this workspace, so profile and resource payloads stay as raw JSON values;
//! only the envelopes the client itself interprets (errors, login tokens) are
//! typed.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// User profile returned by the session endpoint. Opaque to the client.
pub type UserProfile = Value;

/// Normalized failure for every network-facing operation.
///
/// Transport failures, backend rejections and undecodable bodies all collapse
/// into this shape; `message` is always human readable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
    status: Option<u16>,
}

impl ApiError {
    /// Build an error carrying only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    /// Attach the HTTP status the backend answered with.
    #[must_use]
    pub const fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Human-readable message suitable for display.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status, when the failure came from a backend response.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }
}

/// Uniform result returned by every network-facing operation.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error document returned by the backend on non-2xx responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Structured detail; a string for most errors, a list on validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<ErrorDetail>,
}

/// Shapes the backend uses for the `detail` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// Plain message, e.g. `"Invalid credentials"`.
    Message(String),
    /// Request validation failures, one entry per offending field.
    Issues(Vec<ValidationIssue>),
    /// Any other JSON value; carries no usable message.
    Other(Value),
}

/// Single request validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationIssue {
    /// Human-readable description of the failure.
    pub msg: String,
    /// Location of the offending field (`["body", "email"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub loc: Vec<Value>,
}

impl ErrorBody {
    /// Extract a display message from the structured detail, if there is one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            ErrorDetail::Message(message) => {
                let trimmed = message.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            ErrorDetail::Issues(issues) => {
                let joined = issues
                    .iter()
                    .map(|issue| issue.msg.trim())
                    .filter(|msg| !msg.is_empty())
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            ErrorDetail::Other(_) => None,
        }
    }
}

/// Login form submitted to `POST /users/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Account e-mail address.
    pub email: String,
    /// Plain-text password; only ever sent over the wire.
    pub password: String,
}

/// Registration form submitted to `POST /users/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registration {
    /// Account e-mail address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Plain-text password.
    pub password: String,
}

/// Token issued by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    /// Bearer credential to hand to the session store.
    pub access_token: String,
    /// Token scheme reported by the backend (normally `bearer`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
}
