//! Environment lookup for [`ClientConfig`].

use std::path::PathBuf;

use storefront_telemetry::LogFormat;
use tracing::debug;

use crate::defaults;
use crate::error::ConfigResult;
use crate::model::ClientConfig;
use crate::validate::{parse_api_url, parse_log_format};

/// Backend base URL.
pub const ENV_API_URL: &str = "STOREFRONT_API_URL";
/// Session file location.
pub const ENV_SESSION_FILE: &str = "STOREFRONT_SESSION_FILE";
/// Log filter directive.
pub const ENV_LOG: &str = "STOREFRONT_LOG";
/// Log encoding, `pretty` or `json`.
pub const ENV_LOG_FORMAT: &str = "STOREFRONT_LOG_FORMAT";
/// Home directory used to place the default session file.
pub const ENV_HOME: &str = "HOME";

impl ClientConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set to an invalid value.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_url = match read(ENV_API_URL) {
            Some(raw) => parse_api_url(&raw)?,
            None => parse_api_url(defaults::API_URL)?,
        };
        let session_file = read(ENV_SESSION_FILE)
            .map_or_else(|| default_session_file(read(ENV_HOME)), PathBuf::from);
        let log_level = read(ENV_LOG).map_or_else(
            || defaults::LOG_LEVEL.to_string(),
            |level| level.trim().to_string(),
        );
        let log_format = read(ENV_LOG_FORMAT)
            .map_or(Ok(LogFormat::Pretty), |raw| parse_log_format(&raw))?;

        debug!(
            api_url = %api_url,
            session_file = %session_file.display(),
            "loaded client configuration"
        );
        Ok(Self {
            api_url,
            session_file,
            log_level,
            log_format,
        })
    }
}

fn default_session_file(home: Option<String>) -> PathBuf {
    let base = home.map_or_else(|| PathBuf::from("."), PathBuf::from);
    base.join(defaults::STATE_DIR).join(defaults::SESSION_FILE)
}
