//! Common test utilities for integration tests.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot` over an
//! in-memory calculation store, so no database is needed.

// Helpers are shared by several test binaries; not every binary uses all of them.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    response::Response,
    Router,
};
use fake::faker::address::en::CityName;
use fake::Fake;
use persistence::repositories::InMemoryCalculationStore;
use persistence::CalculationStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use traffic_calculator_api::{app::create_app, config::Config};

/// Test configuration backed by the in-memory store.
pub fn test_config() -> Config {
    Config::load_from_defaults(&[
        ("database.backend", "memory"),
        ("logging.format", "pretty"),
        ("logging.level", "debug"),
    ])
    .expect("Failed to load test config")
}

/// Create a test application router over the given store.
pub fn create_test_app(store: Arc<dyn CalculationStore>) -> Router {
    create_app(test_config(), store)
}

/// Create a test application router with a fresh in-memory store.
pub fn create_memory_app() -> (Router, Arc<InMemoryCalculationStore>) {
    let store = Arc::new(InMemoryCalculationStore::new());
    (create_test_app(store.clone()), store)
}

/// Send one request through a clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone()
        .oneshot(request)
        .await
        .expect("Router should not fail")
}

pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body")
        .to_vec()
}

pub async fn parse_response_body(response: Response) -> Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("Response body should be JSON")
}

/// A complete create payload with random place names.
pub fn calculation_payload(daily_loss_minutes: f64) -> Value {
    let origin: String = CityName().fake();
    let destination: String = CityName().fake();

    json!({
        "origin": origin,
        "destination": destination,
        "daily_loss_minutes": daily_loss_minutes,
        "monthly_loss_hours": daily_loss_minutes * 22.0 / 60.0,
        "annual_loss_days": daily_loss_minutes * 250.0 / 1440.0,
        "duration_in_traffic_minutes": 45.0,
        "normal_duration_minutes": 45.0 - daily_loss_minutes / 2.0,
    })
}

/// Create a calculation through the API and return the response body.
pub async fn create_calculation(app: &Router, payload: Value) -> Value {
    let response = send(
        app,
        json_request(Method::POST, "/api/calculations", payload),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    parse_response_body(response).await
}
