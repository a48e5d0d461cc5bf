//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use api_gatekeeper::security::ManualClock;
use api_gatekeeper::{AdmissionGate, HttpServer, PolicyConfig};
use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::Request,
    response::Response,
    Router,
};
use tower::ServiceExt;

pub const SECRET: &str = "SECRET";

/// A fully-layered router whose rate-limit windows follow a manual clock.
pub fn test_router(config: PolicyConfig) -> (Router, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let gate = Arc::new(AdmissionGate::with_clock(&config, clock.clone()));
    let server = HttpServer::with_gate(config, gate);
    (server.router(), clock)
}

/// Default policy with an admin secret configured.
#[allow(dead_code)]
pub fn secret_config() -> PolicyConfig {
    let mut config = PolicyConfig::default();
    config.admin.access_token = Some(SECRET.to_string());
    config
}

/// Default policy with the rate limiter out of the way.
#[allow(dead_code)]
pub fn unlimited_config() -> PolicyConfig {
    let mut config = secret_config();
    config.rate_limit.enabled = false;
    config
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send `request` as if it arrived from `peer_ip`.
pub async fn send(router: &Router, mut request: Request<Body>, peer_ip: &str) -> Response {
    let peer: SocketAddr = format!("{}:40000", peer_ip).parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(peer));
    router.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
