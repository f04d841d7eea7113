#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, Response};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use ticket_purchase_server::config::{Config, StoreBackend};
use ticket_purchase_server::startup::{build_app, Stores};

pub fn test_config() -> Config {
    let mut config = Config::from_lookup(|_| None).unwrap();
    config.store_backend = StoreBackend::Memory;
    config
}

/// Full router, middleware included, over fresh in-memory stores.
pub fn build_test_app() -> Router {
    build_app(&test_config(), &Stores::in_memory())
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<&str>,
    language: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    if let Some(language) = language {
        builder = builder.header("accept-language", language);
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Creates a ticket and returns its id.
pub async fn create_ticket(app: &Router, name: &str, allocation: i32) -> String {
    let body = serde_json::json!({"name": name, "desc": "Main stage", "allocation": allocation});
    let response = post_json(app, "/v1/tickets", &body.to_string()).await;
    body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}
