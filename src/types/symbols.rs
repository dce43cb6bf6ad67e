//! Symbol-master types.
//!
//! Fyers publishes one JSON object per segment, keyed by symbol ticker. The
//! same contract metadata is mirrored into the local cache file, so every
//! field here both deserializes from the broker file and round-trips through
//! the cache.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// IST offset, used to turn expiry timestamps into calendar dates.
const IST_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Contract metadata from the symbol master.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetails {
    /// Underlying name, e.g. `NIFTY`.
    #[serde(default, deserialize_with = "de_string")]
    pub under_sym: String,
    /// `CE`, `PE`, or `XX` for futures.
    #[serde(default, deserialize_with = "de_string")]
    pub opt_type: String,
    #[serde(default, deserialize_with = "de_f64")]
    pub strike_price: f64,
    /// Expiry as a unix timestamp. The broker ships it as a string.
    #[serde(default, deserialize_with = "de_opt_i64")]
    pub expiry_date: Option<i64>,
    #[serde(default, deserialize_with = "de_opt_u32")]
    pub min_lot_size: Option<u32>,
    /// Exchange token; the broker ships it as a number.
    #[serde(default, deserialize_with = "de_opt_string")]
    pub ex_token: Option<String>,
    #[serde(default, deserialize_with = "de_string")]
    pub symbol_desc: String,
    #[serde(default, deserialize_with = "de_string")]
    pub sym_ticker: String,
}

impl SymbolDetails {
    /// Expiry as an IST calendar date.
    pub fn expiry(&self) -> Option<NaiveDate> {
        let ist = FixedOffset::east_opt(IST_OFFSET_SECS)?;
        let ts = DateTime::from_timestamp(self.expiry_date?, 0)?;
        Some(ts.with_timezone(&ist).date_naive())
    }
}

/// One contract for an underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    /// Broker symbol, e.g. `NSE:NIFTY24DEC24000CE`.
    pub symbol: String,
    pub details: SymbolDetails,
}

// ---------------------------------------------------------------------------
// Lenient scalar decoding
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_string(self) -> Option<String> {
        match self {
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) if s.trim().is_empty() => None,
            Self::Str(s) => Some(s.trim().to_owned()),
        }
    }

    fn into_f64(self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(i as f64),
            Self::Float(f) => Some(f),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }

    fn into_i64(self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(i),
            Self::Float(f) => Some(f as i64),
            Self::Str(s) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        }
    }
}

/// `null` reads as empty.
fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .and_then(Scalar::into_string)
        .unwrap_or_default())
}

fn de_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .and_then(Scalar::into_f64)
        .unwrap_or_default())
}

fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_string))
}

fn de_opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?.and_then(Scalar::into_i64))
}

fn de_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(Option::<Scalar>::deserialize(d)?
        .and_then(Scalar::into_i64)
        .and_then(|v| u32::try_from(v).ok()))
}
