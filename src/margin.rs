//! Margin and premium annotation for option-chain rows.

use futures_util::stream::{self, StreamExt, TryStreamExt};

use crate::constants::{MARGIN_CONCURRENCY, UPSTOX_EXCHANGE};
use crate::error::{PremiaError, Result};
use crate::types::TransactionType;
use crate::types::margin::MarginRequest;
use crate::types::option_chain::OptionChainRow;
use crate::upstox::UpstoxClient;

/// Source of `margin_required`.
#[derive(Debug, Clone)]
pub enum MarginCalculator {
    /// Same stand-in margin for every row.
    Fixed(f64),
    /// Per-row lookup against the Upstox margin endpoint.
    Broker(UpstoxClient),
}

impl MarginCalculator {
    /// Fill `premium_earned` and `margin_required` on every row.
    ///
    /// `premium_earned` is `price * lot_size`. In broker mode each row is
    /// priced as a one-lot sell of `NSE_FO|{exchange_token}`; `exchange_token`
    /// maps a row's symbol to its token and must know every row, otherwise the
    /// row is reported as not found.
    pub async fn annotate<F>(
        &self,
        rows: Vec<OptionChainRow>,
        lot_size: u32,
        exchange_token: F,
    ) -> Result<Vec<OptionChainRow>>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lot_size == 0 {
            return Err(PremiaError::Validation("lot size must be positive".into()));
        }

        let rows = rows.into_iter().map(|mut row| {
            row.premium_earned = row.price * f64::from(lot_size);
            row
        });

        match self {
            Self::Fixed(margin) => Ok(rows
                .map(|mut row| {
                    row.margin_required = *margin;
                    row
                })
                .collect()),
            Self::Broker(upstox) => {
                let requests = rows
                    .map(|row| {
                        let token = exchange_token(&row.symbol).ok_or_else(|| {
                            PremiaError::NotFound(format!(
                                "no exchange token for {}",
                                row.symbol
                            ))
                        })?;
                        let req = MarginRequest {
                            transaction_type: TransactionType::SELL,
                            exchange: UPSTOX_EXCHANGE.to_owned(),
                            instrument_key: format!("{UPSTOX_EXCHANGE}|{token}"),
                            quantity: lot_size,
                        };
                        Ok((row, req))
                    })
                    .collect::<Result<Vec<_>>>()?;

                stream::iter(requests)
                    .map(|(mut row, req)| async move {
                        row.margin_required = upstox.get_margin_requirement(&req).await?;
                        Ok::<_, PremiaError>(row)
                    })
                    .buffered(MARGIN_CONCURRENCY)
                    .try_collect()
                    .await
            }
        }
    }
}
