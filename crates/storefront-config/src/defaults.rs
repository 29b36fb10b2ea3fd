//! Fallback values used when the environment is silent.

/// Backend address used by local development servers.
pub(crate) const API_URL: &str = "http://127.0.0.1:8000";
/// Only warnings and errors reach the terminal by default.
pub(crate) const LOG_LEVEL: &str = "warn";
/// Directory, under the home directory, holding client state.
pub(crate) const STATE_DIR: &str = ".storefront";
/// Session file name inside [`STATE_DIR`].
pub(crate) const SESSION_FILE: &str = "session.json";
