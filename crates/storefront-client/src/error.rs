//! Errors raised while constructing an [`crate::ApiClient`].
//!
//! Request failures never surface here; they are normalized into
//! [`storefront_api_models::ApiError`].

use thiserror::Error;

/// Result alias for client construction.
pub type ClientResult<T> = Result<T, ClientError>;

/// Failures building the shared HTTP client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL cannot carry request paths.
    #[error("invalid API base URL")]
    InvalidBaseUrl {
        /// Offending URL.
        value: String,
    },
    /// The request identifier is not a valid header value.
    #[error("invalid request identifier")]
    InvalidRequestId {
        /// Offending identifier.
        value: String,
    },
    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client")]
    HttpClient {
        /// Source reqwest error.
        source: reqwest::Error,
    },
}
