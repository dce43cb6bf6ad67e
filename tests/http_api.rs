//! HTTP surface: the router served on an ephemeral port.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use common::{FakeBroker, expired_creds, service, valid_creds};
use premia::credentials::Credentials;
use premia::margin::MarginCalculator;
use premia::server::create_router;
use premia::server::error::ErrorResponse;
use premia::server::handlers::HealthResponse;

struct TestApp {
    url: String,
    broker: FakeBroker,
    _dir: tempfile::TempDir,
}

async fn spawn_app(creds: Credentials) -> TestApp {
    let broker = FakeBroker::start().await;
    let dir = tempfile::tempdir().unwrap();
    let svc = service(&broker, dir.path(), creds, MarginCalculator::Fixed(0.0), &[("NIFTY", 25)]);
    let app = create_router(Arc::new(svc));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        url: format!("http://{addr}"),
        broker,
        _dir: dir,
    }
}

impl TestApp {
    async fn option_chain(&self, query: &[(&str, &str)]) -> reqwest::Response {
        reqwest::Client::new()
            .get(format!("{}/api/v1/option-chain", self.url))
            .query(query)
            .send()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app(valid_creds()).await;

    let resp = reqwest::get(format!("{}/health", app.url)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: HealthResponse = resp.json().await.unwrap();
    assert_eq!(body.status, "ok");
    assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn option_chain_returns_rows() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[
            ("instrument_name", "NIFTY"),
            ("expiry_date", "2024-12-26"),
            ("side", "CE"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!([{
            "instrument_name": "NIFTY",
            "strike_price": 24000.0,
            "side": "CE",
            "price": 10.0,
            "symbol": "NSE:NIFTY24DEC24000CE",
            "expiry_date": "2024-12-26",
            "margin_required": 0.0,
            "premium_earned": 250.0
        }])
    );
}

#[tokio::test]
async fn lowercase_side_is_accepted() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[
            ("instrument_name", "nifty"),
            ("expiry_date", "2024-12-26"),
            ("side", "pe"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body.len(), 2);
}

#[tokio::test]
async fn bad_side_is_validation_error() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[
            ("instrument_name", "NIFTY"),
            ("expiry_date", "2024-12-26"),
            ("side", "XX"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");
    assert_eq!(app.broker.chain_calls(), 0);
}

#[tokio::test]
async fn bad_date_is_validation_error() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[
            ("instrument_name", "NIFTY"),
            ("expiry_date", "26-12-2024"),
            ("side", "CE"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_parameter_is_bad_request() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[("instrument_name", "NIFTY"), ("side", "CE")])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "VALIDATION_ERROR");
    assert!(body.error.contains("expiry_date"));
    assert_eq!(app.broker.chain_calls(), 0);
}

#[tokio::test]
async fn unknown_instrument_is_not_found() {
    let app = spawn_app(valid_creds()).await;

    let resp = app
        .option_chain(&[
            ("instrument_name", "NOSUCH"),
            ("expiry_date", "2024-12-26"),
            ("side", "CE"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "NOT_FOUND");
    assert!(body.error.contains("NOSUCH"));
}

#[tokio::test]
async fn refresh_failure_is_bad_gateway() {
    let app = spawn_app(expired_creds()).await;
    app.broker.set_refresh(
        StatusCode::UNAUTHORIZED,
        json!({"s": "error", "message": "Invalid pin"}),
    );

    let resp = app
        .option_chain(&[
            ("instrument_name", "NIFTY"),
            ("expiry_date", "2024-12-26"),
            ("side", "CE"),
        ])
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = resp.json().await.unwrap();
    assert_eq!(body.code, "AUTHENTICATION_ERROR");
    assert!(body.error.contains("Invalid pin"));
    assert_eq!(app.broker.chain_calls(), 0);
}
