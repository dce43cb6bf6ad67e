//! Minimal Upstox client for margin lookups.
//!
//! Upstox authenticates with a static bearer token; there is no refresh flow
//! here, so a rejected token surfaces as an upstream error.

use std::time::Duration;

use reqwest::header::{self, HeaderValue};

use crate::client::{default_headers, handle_response, join_url};
use crate::constants::{DEFAULT_HTTP_TIMEOUT_SECS, UPSTOX_BASE_URL, UPSTOX_MARGIN_PATH};
use crate::error::{PremiaError, Result};
use crate::types::margin::{MarginRequest, MarginResponse};

/// HTTP client for the Upstox REST API v2.
#[derive(Debug, Clone)]
pub struct UpstoxClient {
    http: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
}

impl UpstoxClient {
    /// Create a client against the production endpoint.
    pub fn new(access_token: &str) -> Result<Self> {
        Self::with_base_url(
            access_token,
            UPSTOX_BASE_URL,
            Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        )
    }

    /// Create a client pointing at a custom base URL.
    pub fn with_base_url(
        access_token: &str,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(timeout)
            .build()?;
        let auth_header = HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
            PremiaError::Config("Upstox access token contains invalid header characters".into())
        })?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            auth_header,
        })
    }

    /// Margin required for a single order.
    ///
    /// **Endpoint:** `POST /v2/charges/margin`
    pub async fn get_margin_requirement(&self, req: &MarginRequest) -> Result<f64> {
        let url = join_url(&self.base_url, UPSTOX_MARGIN_PATH);
        tracing::debug!(%url, instrument_key = %req.instrument_key, "POST margin");

        let resp = self
            .http
            .post(&url)
            .header(header::AUTHORIZATION, self.auth_header.clone())
            .json(req)
            .send()
            .await?;

        let body: MarginResponse = handle_response(resp).await?;
        Ok(body.data.margin)
    }
}
