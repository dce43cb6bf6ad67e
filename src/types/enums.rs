//! Shared enum types that map directly to broker string values.
//!
//! Variant names match the wire format (`"PE"`, `"CE"`, `"SELL"`), so we
//! suppress the Rust naming convention lint.
#![allow(non_camel_case_types)]

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PremiaError;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Option side requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Put option. Priced at the best bid.
    PE,
    /// Call option. Priced at the best ask.
    CE,
}

impl Side {
    /// Wire value used by Fyers in `option_type` / `optType`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PE => "PE",
            Self::CE => "CE",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = PremiaError;

    /// Case-insensitive; anything other than `PE`/`CE` is a validation error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PE" => Ok(Self::PE),
            "CE" => Ok(Self::CE),
            other => Err(PremiaError::Validation(format!(
                "unsupported side {other:?}, expected PE or CE"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction Type
// ---------------------------------------------------------------------------

/// Order side of a margin query. Written options are always sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    SELL,
}
