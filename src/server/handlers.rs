//! API request handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PremiaError;
use crate::server::error::ApiError;
use crate::service::OptionChainService;
use crate::types::Side;
use crate::types::option_chain::OptionChainRow;

/// Shared handler state.
pub type AppState = Arc<OptionChainService>;

/// Query string of `GET /api/v1/option-chain`.
#[derive(Debug, Deserialize)]
pub struct OptionChainQuery {
    pub instrument_name: String,
    /// `YYYY-MM-DD`.
    pub expiry_date: String,
    /// `PE` or `CE`.
    pub side: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Priced option-chain rows for one instrument, expiry and side.
pub async fn option_chain(
    State(service): State<AppState>,
    query: Result<Query<OptionChainQuery>, QueryRejection>,
) -> Result<Json<Vec<OptionChainRow>>, ApiError> {
    let Query(query) = query.map_err(|e| PremiaError::Validation(e.body_text()))?;
    let side: Side = query.side.parse()?;
    let expiry = parse_expiry(&query.expiry_date)?;
    let instrument = query.instrument_name.trim();
    if instrument.is_empty() {
        return Err(PremiaError::Validation("instrument_name is empty".into()).into());
    }

    let rows = service.option_chain(instrument, expiry, side).await?;
    Ok(Json(rows))
}

fn parse_expiry(raw: &str) -> Result<NaiveDate, PremiaError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        PremiaError::Validation(format!(
            "invalid expiry_date {raw:?}, expected YYYY-MM-DD"
        ))
    })
}
