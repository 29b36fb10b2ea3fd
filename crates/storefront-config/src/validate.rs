//! Field parsing for configuration values.

use storefront_telemetry::LogFormat;
use url::Url;

use crate::error::{ConfigError, ConfigResult};
use crate::loader::{ENV_API_URL, ENV_LOG_FORMAT};

/// Parse a backend URL, requiring an `http`/`https` scheme and a host.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming `STOREFRONT_API_URL`.
pub fn parse_api_url(raw: &str) -> ConfigResult<Url> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|_| ConfigError::invalid(ENV_API_URL, trimmed, "must be an absolute URL"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            ENV_API_URL,
            trimmed,
            "scheme must be http or https",
        ));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid(ENV_API_URL, trimmed, "must include a host"));
    }
    Ok(url)
}

/// Parse a log format name (`pretty`, `text` or `json`, case-insensitive).
///
/// # Errors
///
/// Returns [`ConfigError::InvalidField`] naming `STOREFRONT_LOG_FORMAT`.
pub fn parse_log_format(raw: &str) -> ConfigResult<LogFormat> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pretty" | "text" => Ok(LogFormat::Pretty),
        "json" => Ok(LogFormat::Json),
        _ => Err(ConfigError::invalid(
            ENV_LOG_FORMAT,
            raw,
            "expected 'pretty' or 'json'",
        )),
    }
}
