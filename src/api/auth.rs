//! Token endpoints — refresh-token exchange and the valid-token accessor.
//!
//! These methods hit the auth base URL, not the data base URL.

use chrono::Utc;

use crate::client::{FyersClient, join_url};
use crate::constants::{DEFAULT_TOKEN_LIFETIME_SECS, REFRESH_TOKEN_PATH};
use crate::credentials::Credentials;
use crate::error::{PremiaError, Result};
use crate::types::auth::{RefreshTokenRequest, TokenResponse};

impl FyersClient {
    /// Return an access token that is valid right now.
    ///
    /// Refreshes when no token is stored or the current time has reached the
    /// stored expiry (inclusive). A refresh failure is returned as
    /// [`PremiaError::Authentication`] and is never retried here: repeating
    /// the exchange with a rejected refresh token can lock the account.
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut creds = self.credentials.lock().await;
        if creds.needs_refresh(Utc::now()) {
            tracing::info!(client_id = %self.client_id(), "access token missing or expired");
            self.refresh_locked(&mut creds).await?;
        }
        Ok(creds.access_token.clone())
    }

    /// Unconditionally exchange the refresh token for a new access token.
    ///
    /// **Endpoint:** `POST /api/v3/validate-refresh-token`
    pub async fn refresh_access_token(&self) -> Result<String> {
        let mut creds = self.credentials.lock().await;
        self.refresh_locked(&mut creds).await?;
        Ok(creds.access_token.clone())
    }

    /// Refresh while the caller holds the credential lock, then persist.
    async fn refresh_locked(&self, creds: &mut Credentials) -> Result<()> {
        let url = join_url(self.auth_base_url(), REFRESH_TOKEN_PATH);
        tracing::debug!(%url, "POST refresh_access_token");

        let identity = self.identity();
        let req = RefreshTokenRequest {
            grant_type: "refresh_token".into(),
            app_id_hash: identity.app_id_hash.clone(),
            refresh_token: identity.refresh_token.clone(),
            pin: identity.pin.clone(),
        };

        let resp = self.http().post(&url).json(&req).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        let parsed = serde_json::from_str::<TokenResponse>(&body).ok();

        let ok_status = parsed
            .as_ref()
            .and_then(|r| r.s.as_deref())
            .is_none_or(|s| s.eq_ignore_ascii_case("ok"));
        let token = parsed
            .as_ref()
            .and_then(|r| r.access_token.as_deref())
            .filter(|t| !t.is_empty());

        match (status.is_success() && ok_status, token) {
            (true, Some(token)) => {
                let expires_in = parsed
                    .as_ref()
                    .and_then(|r| r.expires_in)
                    .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
                *creds = Credentials::issued(token, expires_in, Utc::now());
                self.store.save_credentials(creds).await?;
                tracing::info!(expires_at = creds.expires_at, "access token refreshed");
                Ok(())
            }
            _ => {
                let message = parsed
                    .as_ref()
                    .and_then(|r| r.message.clone())
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "Unknown error".to_owned());
                tracing::warn!(%status, %message, "access token refresh rejected");
                Err(PremiaError::Authentication(message))
            }
        }
    }
}
