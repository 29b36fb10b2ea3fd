//! Typed client configuration.

use std::path::PathBuf;

use storefront_telemetry::LogFormat;
use url::Url;

/// Effective settings for one client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL; request paths are appended to it.
    pub api_url: Url,
    /// File holding the persisted credential.
    pub session_file: PathBuf,
    /// Log filter directive, e.g. `warn` or `storefront_client=debug`.
    pub log_level: String,
    /// Log output encoding.
    pub log_format: LogFormat,
}

impl ClientConfig {
    /// Replace the backend URL, typically from a command-line flag.
    #[must_use]
    pub fn with_api_url(mut self, api_url: Url) -> Self {
        self.api_url = api_url;
        self
    }

    /// Replace the session file location.
    #[must_use]
    pub fn with_session_file(mut self, session_file: impl Into<PathBuf>) -> Self {
        self.session_file = session_file.into();
        self
    }
}
