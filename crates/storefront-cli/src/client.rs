//! Application context, error types and shared helpers for the CLI.

use std::fmt::{self, Display, Formatter};
use std::io::{self, IsTerminal};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, anyhow};
use serde_json::Value;
use storefront_api_models::ApiError;
use storefront_client::ApiClient;
use storefront_config::{ClientConfig, parse_api_url};
use storefront_session::{CredentialStore, FileStorage};
use url::Url;

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Classify a normalized backend failure.
///
/// Rejected input (400, 409, 422) is a validation error; everything else,
/// including transport failures without a status, is operational.
pub(crate) fn api_failure(error: ApiError) -> CliError {
    match error.status() {
        Some(400 | 409 | 422) => CliError::validation(error.message()),
        Some(status) => CliError::failure(anyhow!("{} (status {status})", error.message())),
        None => CliError::failure(error),
    }
}

/// Application context passed to command handlers.
#[derive(Clone, Debug)]
pub(crate) struct AppContext {
    pub(crate) api: ApiClient,
}

impl AppContext {
    /// Open the persisted session and build an API client that tags every
    /// request with `trace_id`.
    pub(crate) fn from_config(config: &ClientConfig, trace_id: &str) -> CliResult<Self> {
        let storage = FileStorage::new(&config.session_file);
        let session = CredentialStore::new(Arc::new(storage))
            .context("failed to open session")
            .map_err(CliError::failure)?;
        Self::with_session(config.api_url.clone(), Arc::new(session), trace_id)
    }

    pub(crate) fn with_session(
        api_url: Url,
        session: Arc<CredentialStore>,
        trace_id: &str,
    ) -> CliResult<Self> {
        let api = ApiClient::builder(api_url, session)
            .request_id(trace_id)
            .build()
            .context("failed to build API client")
            .map_err(CliError::failure)?;
        Ok(Self { api })
    }

    pub(crate) fn session(&self) -> &CredentialStore {
        self.api.session()
    }
}

/// Parse the API URL provided to the CLI.
pub(crate) fn parse_url(input: &str) -> Result<Url, String> {
    parse_api_url(input).map_err(|err| err.to_string())
}

/// Parse a `key=value` query pair.
pub(crate) fn parse_query_pair(input: &str) -> Result<(String, String), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("query key cannot be empty in '{input}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Read a JSON request body from disk.
pub(crate) fn read_json_file(path: &Path) -> CliResult<Value> {
    let payload = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))
        .map_err(CliError::failure)?;
    serde_json::from_str(&payload).map_err(|err| {
        CliError::validation(format!("{} is not valid JSON: {err}", path.display()))
    })
}

/// Use the flag value when present, else prompt on an interactive terminal.
pub(crate) fn resolve_password(flag: Option<&str>) -> CliResult<String> {
    if let Some(value) = flag {
        return non_empty_password(value);
    }

    if io::stdin().is_terminal() {
        let pass = rpassword::prompt_password("Password: ").map_err(|err| {
            CliError::failure(anyhow!("failed to read password from stdin: {err}"))
        })?;
        non_empty_password(&pass)
    } else {
        Err(CliError::validation(
            "password required; supply via --password when running non-interactively",
        ))
    }
}

fn non_empty_password(value: &str) -> CliResult<String> {
    if value.is_empty() {
        return Err(CliError::validation("password cannot be empty"));
    }
    Ok(value.to_string())
}

/// Reject blank values for required text flags.
pub(crate) fn required(name: &str, value: &str) -> CliResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::validation(format!("{name} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    #[test]
    fn api_failure_splits_validation_from_operational() {
        let rejected = api_failure(ApiError::new("Email already registered").with_status(409));
        assert_eq!(rejected.exit_code(), 2);
        assert_eq!(rejected.display_message(), "Email already registered");

        let server = api_failure(ApiError::new("Failed to fetch products").with_status(500));
        assert_eq!(server.exit_code(), 3);
        assert_eq!(
            server.display_message(),
            "Failed to fetch products (status 500)"
        );

        let offline = api_failure(ApiError::new("Failed to fetch products"));
        assert_eq!(offline.exit_code(), 3);
        assert_eq!(offline.display_message(), "Failed to fetch products");
    }

    #[test]
    fn parse_query_pair_requires_a_key() {
        assert_eq!(
            parse_query_pair("limit=20"),
            Ok(("limit".to_string(), "20".to_string()))
        );
        assert_eq!(
            parse_query_pair("search="),
            Ok(("search".to_string(), String::new()))
        );
        assert!(parse_query_pair("limit").is_err());
        assert!(parse_query_pair("=20").is_err());
    }

    #[test]
    fn parse_url_rejects_non_http_schemes() {
        assert!(parse_url("http://127.0.0.1:8000").is_ok());
        assert!(parse_url("file:///tmp").is_err());
    }

    #[test]
    fn read_json_file_reports_invalid_json_as_validation() -> Result<()> {
        let dir = TempDir::new()?;
        let good = dir.path().join("good.json");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, r#"{"name": "Boot"}"#)?;
        std::fs::write(&bad, "{name")?;

        assert_eq!(read_json_file(&good).map_err(|err| anyhow!(err.display_message()))?["name"], "Boot");
        assert!(matches!(read_json_file(&bad), Err(CliError::Validation(_))));
        assert!(matches!(
            read_json_file(&dir.path().join("missing.json")),
            Err(CliError::Failure(_))
        ));
        Ok(())
    }

    #[test]
    fn password_flag_must_not_be_empty() {
        assert!(matches!(resolve_password(Some("")), Err(CliError::Validation(_))));
        assert!(matches!(resolve_password(Some("secret")), Ok(ref pass) if pass == "secret"));
    }

    #[test]
    fn required_trims_and_rejects_blank() {
        assert!(matches!(required("email", "  "), Err(CliError::Validation(_))));
        assert!(matches!(required("email", " ann@example.com "), Ok(ref v) if v == "ann@example.com"));
    }
}
