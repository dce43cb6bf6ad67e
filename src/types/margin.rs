//! Margin types for the Upstox charges endpoint.

use serde::{Deserialize, Serialize};

use crate::types::enums::TransactionType;

/// Request body for `POST /v2/charges/margin`.
#[derive(Debug, Clone, Serialize)]
pub struct MarginRequest {
    pub transaction_type: TransactionType,
    pub exchange: String,
    /// `SEGMENT|exchange_token`, e.g. `NSE_FO|43885`.
    pub instrument_key: String,
    pub quantity: u32,
}

/// Inner data of the margin response.
#[derive(Debug, Clone, Deserialize)]
pub struct MarginData {
    pub margin: f64,
}

/// Response from `POST /v2/charges/margin`.
#[derive(Debug, Clone, Deserialize)]
pub struct MarginResponse {
    pub data: MarginData,
}
