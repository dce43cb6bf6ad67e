//! Option Chain types — request parameters, raw quotes, result rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::enums::Side;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Query for `GET /data/options-chain-v3`.
#[derive(Debug, Clone, Serialize)]
pub struct OptionChainRequest {
    /// Fyers symbol, e.g. `NSE:NIFTY24DEC24000CE` or `NSE:NIFTY50-INDEX`.
    pub symbol: String,
    /// Strikes on each side of ATM (1..=50).
    #[serde(rename = "strikecount")]
    pub strike_count: u32,
    /// Expiry as a unix timestamp string; empty selects the nearest expiry.
    pub timestamp: String,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// One entry of `data.optionsChain`.
///
/// The first entry is usually the underlying itself, with an empty
/// `option_type` and a negative strike.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptionQuote {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub option_type: String,
    #[serde(default)]
    pub strike_price: f64,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub ltp: Option<f64>,
    #[serde(default, rename = "fyToken")]
    pub fy_token: Option<String>,
    #[serde(default)]
    pub oi: Option<i64>,
    #[serde(default)]
    pub volume: Option<i64>,
}

/// Inner data envelope of the option chain response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionChainData {
    #[serde(default)]
    pub options_chain: Vec<OptionQuote>,
}

/// Response from `GET /data/options-chain-v3`.
#[derive(Debug, Clone, Deserialize)]
pub struct OptionChainResponse {
    pub s: String,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: OptionChainData,
}

// ---------------------------------------------------------------------------
// Result row
// ---------------------------------------------------------------------------

/// One strike of the filtered chain, as returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionChainRow {
    pub instrument_name: String,
    pub strike_price: f64,
    pub side: Side,
    /// Best bid (PE) or best ask (CE). Always strictly positive.
    pub price: f64,
    pub symbol: String,
    pub expiry_date: NaiveDate,
    pub margin_required: f64,
    pub premium_earned: f64,
}
