//! HTTP server exposing `GET /api/v1/option-chain`.
//!
//! # Usage
//!
//! ```sh
//! # .env holds FYERS_CLIENT_ID, FYERS_CLIENT_ID_HASH, FYERS_REFRESH_TOKEN, FYERS_PIN
//! cargo run --bin premia-server -- premia.toml
//! curl 'http://localhost:8000/api/v1/option-chain?instrument_name=NIFTY&expiry_date=2024-12-26&side=CE'
//! ```
//!
//! The config path is the first argument, else `PREMIA_CONFIG`, else
//! `premia.toml`.

use std::env;
use std::sync::Arc;

use premia::config::Config;
use premia::server::create_router;
use premia::service::OptionChainService;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> premia::error::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var("PREMIA_CONFIG").ok())
        .unwrap_or_else(|| "premia.toml".to_owned());
    let config = Config::load(&config_path)?;
    info!(path = %config_path, "configuration loaded");

    let service = Arc::new(OptionChainService::from_config(&config).await?);
    let app = create_router(service);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
