//! Token refresh types.

use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v3/validate-refresh-token`.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshTokenRequest {
    /// Always `"refresh_token"`.
    pub grant_type: String,
    /// SHA-256 of `client_id:app_secret`.
    #[serde(rename = "appIdHash")]
    pub app_id_hash: String,
    pub refresh_token: String,
    pub pin: String,
}

/// Response from the token refresh endpoint.
///
/// Fyers answers `{"s": "ok", "code": 200, "message": "", "access_token": ".."}`
/// on success and `{"s": "error", "code": -.., "message": ".."}` on failure.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub s: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Seconds until expiry; Fyers usually omits it.
    #[serde(default)]
    pub expires_in: Option<i64>,
}
