//! Shared HTTP client, credential attachment and failure normalization.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storefront_api_models::{ApiError, ApiResult, ErrorBody};
use storefront_session::CredentialStore;
use tracing::{debug, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

/// Header carrying the caller's trace identifier on every request.
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Configured client for the storefront backend.
///
/// Every request built through [`ApiClient::request`] passes the credential
/// hook, and every response read through [`ApiClient::send`] is normalized
/// into an [`ApiResult`].
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    default_headers: HeaderMap,
    session: Arc<CredentialStore>,
}

/// Builder for [`ApiClient`].
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: Url,
    session: Arc<CredentialStore>,
    request_id: Option<String>,
    http: Option<Client>,
}

impl ApiClientBuilder {
    /// Send `request_id` in the `x-request-id` header of every request.
    #[must_use]
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Reuse an existing reqwest client instead of building a fresh one.
    #[must_use]
    pub fn http_client(mut self, http: Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Finish the client.
    ///
    /// # Errors
    ///
    /// Returns an error when the base URL cannot carry paths, the request
    /// identifier is not a valid header value, or the HTTP client fails to build.
    pub fn build(self) -> ClientResult<ApiClient> {
        if self.base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl {
                value: self.base_url.to_string(),
            });
        }

        let mut default_headers = HeaderMap::new();
        if let Some(request_id) = self.request_id {
            let value = HeaderValue::from_str(&request_id)
                .map_err(|_| ClientError::InvalidRequestId { value: request_id })?;
            default_headers.insert(HEADER_REQUEST_ID, value);
        }

        let http = match self.http {
            Some(http) => http,
            None => Client::builder()
                .build()
                .map_err(|source| ClientError::HttpClient { source })?,
        };

        Ok(ApiClient {
            http,
            base_url: self.base_url,
            default_headers,
            session: self.session,
        })
    }
}

impl ApiClient {
    /// Start building a client for `base_url` that authenticates with `session`.
    #[must_use]
    pub fn builder(base_url: Url, session: Arc<CredentialStore>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url,
            session,
            request_id: None,
            http: None,
        }
    }

    /// Session whose credential this client attaches.
    #[must_use]
    pub const fn session(&self) -> &Arc<CredentialStore> {
        &self.session
    }

    /// Backend base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(segments);
        Some(url)
    }

    /// Build a request for the path made of `segments`, relative to the base URL.
    ///
    /// This is the credential hook: the current token is read from the session
    /// store at call time and sent as `Authorization: Bearer <token>`. Without
    /// a token the header is omitted.
    ///
    /// # Errors
    ///
    /// Returns `fallback` when the path cannot be joined onto the base URL.
    pub fn request(
        &self,
        method: Method,
        segments: &[&str],
        fallback: &str,
    ) -> ApiResult<RequestBuilder> {
        let url = self
            .endpoint(segments)
            .ok_or_else(|| ApiError::new(fallback))?;
        let token = self.session.token();
        debug!(
            method = %method,
            path = url.path(),
            credential = token.is_some(),
            "dispatching request"
        );

        let builder = self
            .http
            .request(method, url)
            .headers(self.default_headers.clone());
        Ok(match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send `request` once and normalize the outcome.
    ///
    /// 2xx bodies are decoded as JSON (an empty body decodes as `null`). Any
    /// other outcome becomes an [`ApiError`] whose message is the backend's
    /// `detail` when present, else `fallback`.
    ///
    /// # Errors
    ///
    /// Returns the normalized failure; never a transport error.
    pub async fn send<T>(&self, request: RequestBuilder, fallback: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|err| {
            warn!(error = %err, fallback, "request failed before a response arrived");
            ApiError::new(fallback)
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            warn!(error = %err, status = status.as_u16(), fallback, "failed to read response body");
            ApiError::new(fallback).with_status(status.as_u16())
        })?;

        if !status.is_success() {
            let error = normalize_failure(status, &body, fallback);
            warn!(status = status.as_u16(), error = %error, "request rejected by backend");
            return Err(error);
        }

        decode_success(&body).map_err(|err| {
            warn!(error = %err, status = status.as_u16(), fallback, "failed to decode response body");
            ApiError::new(fallback).with_status(status.as_u16())
        })
    }

    pub(crate) async fn get<T>(&self, segments: &[&str], fallback: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, segments, fallback)?;
        self.send(request, fallback).await
    }

    pub(crate) async fn get_with_query<T>(
        &self,
        segments: &[&str],
        query: &[(String, String)],
        fallback: &str,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::GET, segments, fallback)?.query(query);
        self.send(request, fallback).await
    }

    pub(crate) async fn send_json<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
        fallback: &str,
    ) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(method, segments, fallback)?.json(body);
        self.send(request, fallback).await
    }

    pub(crate) async fn delete<T>(&self, segments: &[&str], fallback: &str) -> ApiResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self.request(Method::DELETE, segments, fallback)?;
        self.send(request, fallback).await
    }
}

/// Convert a non-2xx response into an [`ApiError`].
///
/// The message is the backend's structured `detail` when it has one, else
/// `fallback`.
#[must_use]
pub fn normalize_failure(status: StatusCode, body: &[u8], fallback: &str) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.message())
        .unwrap_or_else(|| fallback.to_string());
    ApiError::new(message).with_status(status.as_u16())
}

fn decode_success<T: DeserializeOwned>(body: &[u8]) -> serde_json::Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_slice(b"null")
    } else {
        serde_json::from_slice(body)
    }
}
