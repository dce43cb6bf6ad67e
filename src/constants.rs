//! Constants for the Fyers and Upstox APIs and the local caches.
//!
//! Base URLs are defaults only; every client accepts a custom base URL so the
//! crate can be pointed at a sandbox or a mock server.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Base URLs
// ---------------------------------------------------------------------------

/// Base URL for the Fyers data API (option chain).
pub const API_BASE_URL: &str = "https://api-t1.fyers.in";

/// Base URL for the Fyers token endpoints.
pub const AUTH_BASE_URL: &str = "https://api-t1.fyers.in";

/// Base URL for the Upstox REST API v2.
pub const UPSTOX_BASE_URL: &str = "https://api.upstox.com";

/// Default symbol-master sources (F&O contracts on NSE and BSE).
pub const SYMBOL_MASTER_URLS: &[&str] = &[
    "https://public.fyers.in/sym_details/NSE_FO_sym_master.json",
    "https://public.fyers.in/sym_details/BSE_FO_sym_master.json",
];

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// Token refresh endpoint (relative to [`AUTH_BASE_URL`]).
pub const REFRESH_TOKEN_PATH: &str = "/api/v3/validate-refresh-token";

/// Option chain endpoint (relative to [`API_BASE_URL`]).
pub const OPTION_CHAIN_PATH: &str = "/data/options-chain-v3";

/// Upstox margin endpoint (relative to [`UPSTOX_BASE_URL`]).
pub const UPSTOX_MARGIN_PATH: &str = "/v2/charges/margin";

// ---------------------------------------------------------------------------
// Credential store keys
// ---------------------------------------------------------------------------

/// Credential store keys, matching the `.env` layout the service reads.
pub mod keys {
    pub const CLIENT_ID: &str = "FYERS_CLIENT_ID";
    pub const CLIENT_ID_HASH: &str = "FYERS_CLIENT_ID_HASH";
    pub const REFRESH_TOKEN: &str = "FYERS_REFRESH_TOKEN";
    pub const PIN: &str = "FYERS_PIN";
    pub const ACCESS_TOKEN: &str = "FYERS_ACCESS_TOKEN";
    pub const TOKEN_EXPIRES_AT: &str = "FYERS_TOKEN_EXPIRES_AT";
    pub const UPSTOX_ACCESS_TOKEN: &str = "UPSTOX_ACCESS_TOKEN";
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Lifetime assumed for a refreshed token when the broker omits `expires_in`.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 86_400;

/// Tokens are treated as expired this many seconds before the broker says so.
pub const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// Age after which the on-disk symbol cache is rebuilt.
pub const SYMBOL_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Maximum strikes the option chain endpoint returns on each side of ATM.
pub const MAX_STRIKE_COUNT: u32 = 50;

/// Default timeout for every outbound HTTP request.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Maximum in-flight margin lookups for a single option-chain request.
pub const MARGIN_CONCURRENCY: usize = 4;

/// Exchange segment sent to the Upstox margin endpoint.
pub const UPSTOX_EXCHANGE: &str = "NSE_FO";
