//! Broker credentials and the flat `KEY=VALUE` store they persist to.
//!
//! The store is the same `.env`-style file the service reads its Fyers
//! identity from. Refreshed tokens are written back into it without touching
//! any other key.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::constants::{TOKEN_EXPIRY_MARGIN_SECS, keys};
use crate::error::{PremiaError, Result};
use crate::persist::write_atomic;

// ---------------------------------------------------------------------------
// Credential state
// ---------------------------------------------------------------------------

/// Access token and its (margin-adjusted) expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Current access token. Empty means "no token".
    pub access_token: String,
    /// Unix timestamp (seconds) at which the token must be refreshed.
    pub expires_at: i64,
}

impl Credentials {
    /// Build credentials from a freshly issued token.
    ///
    /// The stored expiry is `now + expires_in - 60s` so the token is replaced
    /// before the broker starts rejecting it.
    pub fn issued(access_token: impl Into<String>, expires_in: i64, now: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: now
                .timestamp()
                .saturating_add(expires_in)
                .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS),
        }
    }

    /// `true` when there is no token or `now` has reached the stored expiry.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_empty() || now.timestamp() >= self.expires_at
    }
}

/// Static Fyers identity used to exchange the refresh token.
#[derive(Clone)]
pub struct BrokerIdentity {
    /// Fyers app/client ID (e.g. `XB12345-100`).
    pub client_id: String,
    /// SHA-256 of `client_id:app_secret`, issued by Fyers.
    pub app_id_hash: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Account PIN.
    pub pin: String,
}

impl std::fmt::Debug for BrokerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerIdentity")
            .field("client_id", &self.client_id)
            .field("app_id_hash", &"***")
            .field("refresh_token", &"***")
            .field("pin", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Flat `KEY=VALUE` file.
///
/// Blank lines, `#` comments, and lines without `=` are skipped on read.
/// Values are split on the first `=` only.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every key in the store. A missing file reads as empty.
    pub async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(parse_env(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge `vars` into the store and rewrite it atomically.
    pub async fn update<I, K, V>(&self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut current = self.load().await?;
        current.extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        write_atomic(&self.path, render_env(&current).as_bytes()).await
    }

    /// Persist a refreshed token.
    pub async fn save_credentials(&self, creds: &Credentials) -> Result<()> {
        self.update([
            (keys::ACCESS_TOKEN, creds.access_token.clone()),
            (keys::TOKEN_EXPIRES_AT, creds.expires_at.to_string()),
        ])
        .await
    }

    /// Load the Fyers identity and the last persisted token.
    ///
    /// Environment variables with the same names take precedence over the
    /// file. Identity keys are required; token keys default to empty/zero.
    pub async fn load_fyers(&self) -> Result<(BrokerIdentity, Credentials)> {
        let mut vars = self.load().await?;
        for key in [
            keys::CLIENT_ID,
            keys::CLIENT_ID_HASH,
            keys::REFRESH_TOKEN,
            keys::PIN,
            keys::ACCESS_TOKEN,
            keys::TOKEN_EXPIRES_AT,
        ] {
            if let Ok(value) = std::env::var(key) {
                vars.insert(key.to_owned(), value);
            }
        }

        let required = |key: &str| -> Result<String> {
            vars.get(key)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| {
                    PremiaError::Config(format!(
                        "{key} missing from {}",
                        self.path.display()
                    ))
                })
        };

        let identity = BrokerIdentity {
            client_id: required(keys::CLIENT_ID)?,
            app_id_hash: required(keys::CLIENT_ID_HASH)?,
            refresh_token: required(keys::REFRESH_TOKEN)?,
            pin: required(keys::PIN)?,
        };

        let expires_at = match vars.get(keys::TOKEN_EXPIRES_AT).map(|s| s.trim()) {
            None | Some("") => 0,
            Some(raw) => raw.parse().map_err(|_| {
                PremiaError::Config(format!("{} is not a unix timestamp: {raw}", keys::TOKEN_EXPIRES_AT))
            })?,
        };
        let creds = Credentials {
            access_token: vars.get(keys::ACCESS_TOKEN).cloned().unwrap_or_default(),
            expires_at,
        };

        Ok((identity, creds))
    }

    /// Look up a single key, environment first.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        if let Ok(value) = std::env::var(key) {
            return Ok(Some(value));
        }
        Ok(self.load().await?.remove(key))
    }
}

fn parse_env(content: &str) -> BTreeMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_owned(), v.trim().to_owned()))
        .collect()
}

fn render_env(vars: &BTreeMap<String, String>) -> String {
    vars.iter().map(|(k, v)| format!("{k}={v}\n")).collect()
}
