//! Shared fixtures: an in-process fake broker and builders wired against it.
//!
//! The fake broker serves the Fyers token and option-chain endpoints, any
//! number of symbol-master files under `/sym/{name}`, and the Upstox margin
//! endpoint. Every endpoint counts its hits so tests can assert on network
//! traffic.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use premia::client::FyersClient;
use premia::credentials::{BrokerIdentity, CredentialStore, Credentials};
use premia::margin::MarginCalculator;
use premia::service::OptionChainService;
use premia::symbols::SymbolResolver;

/// 2024-12-26 15:30 IST.
pub const EXPIRY_TS: i64 = 1_735_207_200;

pub fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, 26).unwrap()
}

// ---------------------------------------------------------------------------
// Fake broker
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeState {
    pub refresh_calls: AtomicUsize,
    pub chain_calls: AtomicUsize,
    pub symbol_calls: AtomicUsize,
    pub margin_calls: AtomicUsize,
    refresh_response: Mutex<Option<(StatusCode, Value)>>,
    chain_response: Mutex<Option<(StatusCode, Value)>>,
    sources: Mutex<HashMap<String, (StatusCode, Value)>>,
    margin_value: Mutex<f64>,
    margin_failure: Mutex<Option<(StatusCode, Value)>>,
    pub last_chain_auth: Mutex<Option<String>>,
    pub last_chain_query: Mutex<HashMap<String, String>>,
    pub margin_requests: Mutex<Vec<Value>>,
    pub last_margin_auth: Mutex<Option<String>>,
}

#[derive(Clone)]
pub struct FakeBroker {
    pub url: String,
    pub state: Arc<FakeState>,
}

impl FakeBroker {
    /// Start a broker with a succeeding token endpoint, the NIFTY chain and
    /// two symbol sources (`nse`, `bse`).
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        *state.refresh_response.lock().unwrap() = Some((
            StatusCode::OK,
            json!({"s": "ok", "code": 200, "message": "", "access_token": "fresh-token"}),
        ));
        *state.chain_response.lock().unwrap() = Some((StatusCode::OK, nifty_chain()));
        {
            let mut sources = state.sources.lock().unwrap();
            sources.insert("nse".into(), (StatusCode::OK, nse_master()));
            sources.insert("bse".into(), (StatusCode::OK, bse_master()));
        }
        *state.margin_value.lock().unwrap() = 125_000.5;

        let app = Router::new()
            .route("/api/v3/validate-refresh-token", post(refresh_handler))
            .route("/data/options-chain-v3", get(chain_handler))
            .route("/sym/{name}", get(symbol_handler))
            .route("/v2/charges/margin", post(margin_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn source_url(&self, name: &str) -> String {
        format!("{}/sym/{name}", self.url)
    }

    pub fn set_refresh(&self, status: StatusCode, body: Value) {
        *self.state.refresh_response.lock().unwrap() = Some((status, body));
    }

    pub fn set_chain(&self, status: StatusCode, body: Value) {
        *self.state.chain_response.lock().unwrap() = Some((status, body));
    }

    pub fn set_source(&self, name: &str, status: StatusCode, body: Value) {
        self.state
            .sources
            .lock()
            .unwrap()
            .insert(name.to_owned(), (status, body));
    }

    /// Make the margin endpoint answer with `status` and `body`.
    pub fn fail_margin(&self, status: StatusCode, body: Value) {
        *self.state.margin_failure.lock().unwrap() = Some((status, body));
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn chain_calls(&self) -> usize {
        self.state.chain_calls.load(Ordering::SeqCst)
    }

    pub fn symbol_calls(&self) -> usize {
        self.state.symbol_calls.load(Ordering::SeqCst)
    }

    pub fn margin_calls(&self) -> usize {
        self.state.margin_calls.load(Ordering::SeqCst)
    }
}

async fn refresh_handler(
    State(state): State<Arc<FakeState>>,
    Json(_body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    // Wide enough for concurrent callers to pile up behind the lock.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let (status, body) = state.refresh_response.lock().unwrap().clone().unwrap();
    (status, Json(body))
}

async fn chain_handler(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    state.chain_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_chain_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    *state.last_chain_query.lock().unwrap() = query;
    let (status, body) = state.chain_response.lock().unwrap().clone().unwrap();
    (status, Json(body))
}

async fn symbol_handler(
    State(state): State<Arc<FakeState>>,
    UrlPath(name): UrlPath<String>,
) -> (StatusCode, Json<Value>) {
    state.symbol_calls.fetch_add(1, Ordering::SeqCst);
    let found = state.sources.lock().unwrap().get(&name).cloned();
    match found {
        Some((status, body)) => (status, Json(body)),
        None => (StatusCode::NOT_FOUND, Json(json!({"message": "no such file"}))),
    }
}

async fn margin_handler(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.margin_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_margin_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    state.margin_requests.lock().unwrap().push(body);
    if let Some((status, body)) = state.margin_failure.lock().unwrap().clone() {
        return (status, Json(body));
    }
    let margin = *state.margin_value.lock().unwrap();
    (
        StatusCode::OK,
        Json(json!({"status": "success", "data": {"margin": margin}})),
    )
}

// ---------------------------------------------------------------------------
// Broker payloads
// ---------------------------------------------------------------------------

fn contract(under: &str, ticker: &str, opt: &str, strike: f64, ex_token: u64, lot: u32) -> Value {
    json!({
        "underSym": under,
        "optType": opt,
        "strikePrice": strike,
        "expiryDate": EXPIRY_TS.to_string(),
        "minLotSize": lot,
        "exToken": ex_token,
        "symbolDesc": format!("{under} 26 Dec 24 {strike} {opt}"),
        "symTicker": ticker,
        "tickSize": 0.05,
        "exchange": 10,
        "segment": 11
    })
}

/// NIFTY contracts for the 2024-12-26 expiry, lot size 75 in the master.
pub fn nse_master() -> Value {
    json!({
        "NSE:NIFTY24DEC24000CE": contract("NIFTY", "NSE:NIFTY24DEC24000CE", "CE", 24000.0, 43885, 75),
        "NSE:NIFTY24DEC24100CE": contract("NIFTY", "NSE:NIFTY24DEC24100CE", "CE", 24100.0, 43887, 75),
        "NSE:NIFTY24DEC24000PE": contract("NIFTY", "NSE:NIFTY24DEC24000PE", "PE", 24000.0, 43886, 75),
        "NSE:NIFTY24DEC24100PE": contract("NIFTY", "NSE:NIFTY24DEC24100PE", "PE", 24100.0, 43888, 75),
    })
}

pub fn bse_master() -> Value {
    json!({
        "BSE:SENSEX24DEC80000CE": contract("SENSEX", "BSE:SENSEX24DEC80000CE", "CE", 80000.0, 90001, 10),
    })
}

/// Underlying row plus two call strikes (ask 10 and 0) and two put strikes.
pub fn nifty_chain() -> Value {
    json!({
        "s": "ok",
        "code": 200,
        "message": "",
        "data": {
            "expiryData": [{"date": "26-12-2024", "expiry": EXPIRY_TS.to_string()}],
            "optionsChain": [
                {"symbol": "NSE:NIFTY50-INDEX", "option_type": "", "strike_price": -1, "ltp": 24050.0, "bid": 0, "ask": 0},
                {"symbol": "NSE:NIFTY24DEC24000CE", "option_type": "CE", "strike_price": 24000, "bid": 9.5, "ask": 10, "ltp": 9.8},
                {"symbol": "NSE:NIFTY24DEC24100CE", "option_type": "CE", "strike_price": 24100, "bid": 0, "ask": 0, "ltp": 0.05},
                {"symbol": "NSE:NIFTY24DEC24000PE", "option_type": "PE", "strike_price": 24000, "bid": 42.5, "ask": 43, "ltp": 42.7},
                {"symbol": "NSE:NIFTY24DEC24100PE", "option_type": "PE", "strike_price": 24100, "bid": 88, "ask": 89.5, "ltp": 88.9}
            ]
        }
    })
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn identity() -> BrokerIdentity {
    BrokerIdentity {
        client_id: "XB12345-100".into(),
        app_id_hash: "hash".into(),
        refresh_token: "refresh".into(),
        pin: "1234".into(),
    }
}

/// A token that stays valid for the next hour.
pub fn valid_creds() -> Credentials {
    Credentials {
        access_token: "cached-token".into(),
        expires_at: Utc::now().timestamp() + 3_600,
    }
}

pub fn expired_creds() -> Credentials {
    Credentials {
        access_token: "stale-token".into(),
        expires_at: Utc::now().timestamp() - 10,
    }
}

pub fn fyers_client(broker: &FakeBroker, store: CredentialStore, creds: Credentials) -> FyersClient {
    FyersClient::new(identity(), creds, store)
        .unwrap()
        .with_base_url(&broker.url)
        .with_auth_base_url(&broker.url)
        .with_timeout(Duration::from_secs(5))
        .unwrap()
}

pub fn resolver(broker: &FakeBroker, dir: &Path, sources: &[&str]) -> SymbolResolver {
    SymbolResolver::new(
        dir.join("symbol_cache.json"),
        sources.iter().map(|s| broker.source_url(s)).collect(),
    )
    .unwrap()
    .with_timeout(Duration::from_secs(5))
    .unwrap()
}

pub fn service(
    broker: &FakeBroker,
    dir: &Path,
    creds: Credentials,
    margin: MarginCalculator,
    lot_sizes: &[(&str, u32)],
) -> OptionChainService {
    let store = CredentialStore::new(dir.join(".env"));
    let lot_sizes: BTreeMap<String, u32> = lot_sizes
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect();
    OptionChainService::new(
        fyers_client(broker, store, creds),
        resolver(broker, dir, &["nse", "bse"]),
        margin,
        lot_sizes,
        50,
    )
}

/// Backdate a file's modification time.
pub fn set_age(path: &Path, age: Duration) {
    let file = std::fs::File::options().write(true).open(path).unwrap();
    file.set_modified(std::time::SystemTime::now() - age).unwrap();
}
