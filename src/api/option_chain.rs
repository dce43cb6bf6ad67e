//! Option Chain endpoint — per-strike bid/ask around ATM.

use crate::client::FyersClient;
use crate::constants::{MAX_STRIKE_COUNT, OPTION_CHAIN_PATH};
use crate::error::{ApiErrorBody, PremiaError, Result};
use crate::types::option_chain::*;

impl FyersClient {
    /// Retrieve the raw option chain response.
    ///
    /// **Endpoint:** `GET /data/options-chain-v3`
    pub async fn get_option_chain(&self, req: &OptionChainRequest) -> Result<OptionChainResponse> {
        self.get(OPTION_CHAIN_PATH, req).await
    }

    /// Fetch the per-strike quotes for `symbol`.
    ///
    /// `expiry` is the contract's expiry timestamp (`None` lets the broker pick
    /// the nearest expiry). `strike_count` is clamped to `1..=50`. A response
    /// whose status is not `"ok"` becomes [`PremiaError::Api`].
    pub async fn fetch_chain(
        &self,
        symbol: &str,
        expiry: Option<i64>,
        strike_count: u32,
    ) -> Result<Vec<OptionQuote>> {
        let req = OptionChainRequest {
            symbol: symbol.to_owned(),
            strike_count: strike_count.clamp(1, MAX_STRIKE_COUNT),
            timestamp: expiry.map(|ts| ts.to_string()).unwrap_or_default(),
        };

        let resp = self.get_option_chain(&req).await?;
        if !resp.s.eq_ignore_ascii_case("ok") {
            return Err(PremiaError::Api(ApiErrorBody {
                s: Some(resp.s),
                code: resp.code,
                message: resp.message,
            }));
        }

        tracing::debug!(
            symbol,
            quotes = resp.data.options_chain.len(),
            "option chain fetched"
        );
        Ok(resp.data.options_chain)
    }
}
