//! # premia
//!
//! Option-chain premium and margin service for the
//! [Fyers API v3](https://myapi.fyers.in/docsv3).
//!
//! A request names an instrument, an expiry and a side. The crate resolves
//! the instrument through a cached copy of the Fyers symbol master, makes sure
//! the access token is valid (refreshing and persisting it when needed),
//! fetches the option chain, keeps the strikes with a positive price, and
//! annotates each with premium and margin.
//!
//! ## Quick Start
//!
//! ```no_run
//! use premia::config::Config;
//! use premia::service::OptionChainService;
//! use premia::types::Side;
//!
//! #[tokio::main]
//! async fn main() -> premia::error::Result<()> {
//!     let config = Config::load("premia.toml")?;
//!     let service = OptionChainService::from_config(&config).await?;
//!     let expiry = chrono::NaiveDate::from_ymd_opt(2024, 12, 26).unwrap();
//!     let rows = service.option_chain("NIFTY", expiry, Side::CE).await?;
//!     println!("{} strikes", rows.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chain;
pub mod client;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod error;
pub mod margin;
pub mod persist;
pub mod server;
pub mod service;
pub mod symbols;
pub mod types;
pub mod upstox;

/// Re-export the main client type at crate root for convenience.
pub use client::FyersClient;
/// Re-export the error type and Result alias.
pub use error::{PremiaError, Result};
pub use service::OptionChainService;
pub use symbols::SymbolResolver;
