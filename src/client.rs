//! Core HTTP client for the Fyers REST API.
//!
//! The [`FyersClient`] struct owns the broker identity, the current access
//! token, and the credential store the token is persisted to. It wraps
//! [`reqwest::Client`] with the `Authorization: {client_id}:{token}` header
//! and provides a typed `get` helper.
//!
//! API endpoint methods are added to `FyersClient` via `impl` blocks in the
//! [`crate::api`] module.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::constants::{API_BASE_URL, AUTH_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECS};
use crate::credentials::{BrokerIdentity, CredentialStore, Credentials};
use crate::error::{ApiErrorBody, PremiaError, Result};

/// Core HTTP client for the Fyers REST API.
///
/// The credential state lives behind a [`Mutex`]: readers take a snapshot,
/// and a refresh holds the lock for its whole duration so concurrent callers
/// wait for the new token instead of refreshing again.
///
/// # Example
///
/// ```no_run
/// use premia::client::FyersClient;
/// use premia::credentials::CredentialStore;
///
/// # #[tokio::main]
/// # async fn main() -> premia::error::Result<()> {
/// let store = CredentialStore::new(".env");
/// let (identity, creds) = store.load_fyers().await?;
/// let client = FyersClient::new(identity, creds, store)?;
/// let token = client.get_valid_token().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FyersClient {
    http: reqwest::Client,
    identity: BrokerIdentity,
    pub(crate) credentials: Mutex<Credentials>,
    pub(crate) store: CredentialStore,
    /// Base URL for data requests (defaults to [`API_BASE_URL`]).
    base_url: String,
    /// Base URL for token requests (defaults to [`AUTH_BASE_URL`]).
    auth_base_url: String,
}

impl FyersClient {
    /// Create a client against the production endpoints with the default timeout.
    pub fn new(
        identity: BrokerIdentity,
        credentials: Credentials,
        store: CredentialStore,
    ) -> Result<Self> {
        Ok(Self {
            http: Self::build_http(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))?,
            identity,
            credentials: Mutex::new(credentials),
            store,
            base_url: API_BASE_URL.to_owned(),
            auth_base_url: AUTH_BASE_URL.to_owned(),
        })
    }

    /// Point data requests at a custom base URL.
    ///
    /// Useful for testing against a sandbox or mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Point token requests at a custom base URL.
    pub fn with_auth_base_url(mut self, auth_base_url: impl Into<String>) -> Self {
        self.auth_base_url = auth_base_url.into().trim_end_matches('/').to_owned();
        self
    }

    /// Replace the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = Self::build_http(timeout)?;
        Ok(self)
    }

    /// Returns a reference to the underlying `reqwest::Client`.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Returns the Fyers client ID.
    pub fn client_id(&self) -> &str {
        &self.identity.client_id
    }

    pub(crate) fn identity(&self) -> &BrokerIdentity {
        &self.identity
    }

    /// Returns the credential store backing this client.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Snapshot of the current credential state.
    pub async fn credentials(&self) -> Credentials {
        self.credentials.lock().await.clone()
    }

    /// Returns the data base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the auth base URL.
    pub fn auth_base_url(&self) -> &str {
        &self.auth_base_url
    }

    // -----------------------------------------------------------------------
    // Generic HTTP helpers
    // -----------------------------------------------------------------------

    /// Perform an authenticated GET with query parameters and deserialize the
    /// JSON response. The token is refreshed first when needed.
    pub async fn get<Q: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<R> {
        let url = join_url(&self.base_url, path);
        let auth = self.auth_header().await?;
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .header(header::AUTHORIZATION, auth)
            .query(query)
            .send()
            .await?;

        handle_response(resp).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn build_http(timeout: Duration) -> Result<reqwest::Client> {
        Ok(reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(timeout)
            .build()?)
    }

    /// `Authorization: {client_id}:{access_token}` with a valid token.
    async fn auth_header(&self) -> Result<HeaderValue> {
        let token = self.get_valid_token().await?;
        HeaderValue::from_str(&format!("{}:{}", self.identity.client_id, token)).map_err(|_| {
            PremiaError::Validation("access token contains invalid header characters".into())
        })
    }
}

/// Build the full URL from a base and a path segment.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Default headers applied to every request.
pub(crate) fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

/// Read a response, returning either the deserialized body or a `PremiaError`.
pub(crate) async fn handle_response<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R> {
    let status = resp.status();
    let bytes = resp.bytes().await?;

    if status.is_success() {
        serde_json::from_slice(&bytes).map_err(PremiaError::Json)
    } else {
        let body = String::from_utf8_lossy(&bytes);
        Err(parse_error_body(status, &body))
    }
}

/// Try to parse the broker's JSON error structure; fall back to a raw HTTP
/// status error.
pub(crate) fn parse_error_body(status: reqwest::StatusCode, body: &str) -> PremiaError {
    if let Ok(api_err) = serde_json::from_str::<ApiErrorBody>(body) {
        if api_err.message.is_some() || api_err.code.is_some() {
            return PremiaError::Api(api_err);
        }
    }
    PremiaError::HttpStatus {
        status,
        body: body.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_handles_leading_slash() {
        assert_eq!(join_url("http://a", "/x"), "http://a/x");
        assert_eq!(join_url("http://a", "x"), "http://a/x");
    }

    #[test]
    fn parse_error_body_prefers_api_envelope() {
        let err = parse_error_body(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"s":"error","code":-16,"message":"Could not authenticate"}"#,
        );
        assert!(matches!(err, PremiaError::Api(ref b) if b.code == Some(-16)));
    }

    #[test]
    fn parse_error_body_falls_back_to_status() {
        let err = parse_error_body(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(
            err,
            PremiaError::HttpStatus { status, .. } if status == reqwest::StatusCode::BAD_GATEWAY
        ));
    }
}
