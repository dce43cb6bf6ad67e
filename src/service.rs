//! The option-chain pipeline: resolve → authenticate → fetch → filter → annotate.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::chain::extract_rows;
use crate::client::FyersClient;
use crate::config::{Config, MarginMode};
use crate::constants::keys;
use crate::credentials::CredentialStore;
use crate::error::{PremiaError, Result};
use crate::margin::MarginCalculator;
use crate::symbols::SymbolResolver;
use crate::types::Side;
use crate::types::option_chain::OptionChainRow;
use crate::upstox::UpstoxClient;

/// Everything one option-chain request needs, shared across requests.
pub struct OptionChainService {
    fyers: FyersClient,
    resolver: SymbolResolver,
    margin: MarginCalculator,
    lot_sizes: BTreeMap<String, u32>,
    strike_count: u32,
}

impl OptionChainService {
    pub fn new(
        fyers: FyersClient,
        resolver: SymbolResolver,
        margin: MarginCalculator,
        lot_sizes: BTreeMap<String, u32>,
        strike_count: u32,
    ) -> Self {
        let lot_sizes = lot_sizes
            .into_iter()
            .map(|(k, v)| (k.to_uppercase(), v))
            .collect();
        Self {
            fyers,
            resolver,
            margin,
            lot_sizes,
            strike_count,
        }
    }

    /// Wire the service from configuration and the credential store.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let store = CredentialStore::new(&config.broker.credentials_path);
        let (identity, creds) = store.load_fyers().await?;
        let timeout = config.broker.timeout();

        let fyers = FyersClient::new(identity, creds, store.clone())?
            .with_base_url(&config.broker.api_base_url)
            .with_auth_base_url(&config.broker.auth_base_url)
            .with_timeout(timeout)?;

        let resolver = SymbolResolver::new(&config.symbols.cache_path, config.symbols.sources.clone())?
            .allow_partial(config.symbols.allow_partial)
            .with_timeout(timeout)?;

        let margin = match config.margin.mode {
            MarginMode::Fixed => MarginCalculator::Fixed(config.margin.fixed_margin),
            MarginMode::Broker => {
                let token = store.get(keys::UPSTOX_ACCESS_TOKEN).await?.ok_or_else(|| {
                    PremiaError::Config(format!(
                        "{} is required for broker margin mode",
                        keys::UPSTOX_ACCESS_TOKEN
                    ))
                })?;
                MarginCalculator::Broker(UpstoxClient::with_base_url(
                    &token,
                    &config.margin.upstox_base_url,
                    timeout,
                )?)
            }
        };

        Ok(Self::new(
            fyers,
            resolver,
            margin,
            config.lot_sizes.clone(),
            config.broker.strike_count,
        ))
    }

    pub fn fyers(&self) -> &FyersClient {
        &self.fyers
    }

    pub fn resolver(&self) -> &SymbolResolver {
        &self.resolver
    }

    /// Priced rows for one side of `instrument_name`'s chain at `expiry_date`.
    ///
    /// The token is validated before the chain endpoint is touched, so an
    /// authentication failure never reaches it.
    pub async fn option_chain(
        &self,
        instrument_name: &str,
        expiry_date: NaiveDate,
        side: Side,
    ) -> Result<Vec<OptionChainRow>> {
        tracing::info!(instrument = instrument_name, %expiry_date, %side, "option chain requested");

        let contract = self
            .resolver
            .select_contract(instrument_name, expiry_date, side)
            .await?;
        tracing::debug!(symbol = %contract.symbol, "contract selected");

        let lot_size = self
            .lot_sizes
            .get(&instrument_name.trim().to_uppercase())
            .copied()
            .or(contract.details.min_lot_size)
            .ok_or_else(|| {
                PremiaError::Validation(format!("no lot size known for {instrument_name}"))
            })?;

        self.fyers.get_valid_token().await?;

        let quotes = self
            .fyers
            .fetch_chain(&contract.symbol, contract.details.expiry_date, self.strike_count)
            .await?;

        let rows = extract_rows(&quotes, instrument_name.trim(), side, expiry_date);

        let contracts = match self.margin {
            MarginCalculator::Broker(_) => self.resolver.resolve(instrument_name).await?,
            MarginCalculator::Fixed(_) => Vec::new(),
        };
        let rows = self
            .margin
            .annotate(rows, lot_size, |symbol| {
                contracts
                    .iter()
                    .find(|c| c.symbol == symbol)
                    .and_then(|c| c.details.ex_token.clone())
            })
            .await?;

        tracing::info!(rows = rows.len(), "option chain served");
        Ok(rows)
    }
}
