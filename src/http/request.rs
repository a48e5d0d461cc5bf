//! Request inspection.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4)
//! - Derive the client identity used as the rate-limit key
//! - Build the gate's `RequestContext` from an HTTP request
//!
//! # Design Decisions
//! - `X-Forwarded-For` is ignored unless the policy trusts it
//! - Only the `accessToken` query field is read; the rest of the query is never
//!   copied or logged

use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{header, HeaderMap, HeaderValue, Method, Request};
use serde::Deserialize;
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::gate::RequestContext;
use crate::security::cors::Preflight;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Query parameter carrying the admin shared secret.
pub const ACCESS_TOKEN_PARAM: &str = "accessToken";

/// Assigns a UUID v4 to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

#[derive(Debug, Default, Deserialize)]
struct AccessQuery {
    #[serde(rename = "accessToken")]
    access_token: Option<String>,
}

/// The rate-limit key for a request.
pub fn client_identity(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    peer.ip().to_string()
}

/// Build the gate input for `request`.
pub fn request_context<B>(
    request: &Request<B>,
    peer: SocketAddr,
    trust_forwarded_for: bool,
) -> RequestContext {
    let headers = request.headers();

    let access_token = Query::<AccessQuery>::try_from_uri(request.uri())
        .map(|Query(q)| q.access_token)
        .unwrap_or_default();

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let preflight = (request.method() == Method::OPTIONS
        && headers.contains_key(header::ACCESS_CONTROL_REQUEST_METHOD))
    .then(|| Preflight {
        request_headers: headers
            .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    RequestContext {
        client: client_identity(headers, peer, trust_forwarded_for),
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        origin,
        preflight,
        access_token,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn peer() -> SocketAddr {
        "198.51.100.4:51234".parse().unwrap()
    }

    #[test]
    fn identity_is_peer_ip_by_default() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        assert_eq!(client_identity(&headers, peer(), false), "198.51.100.4");
    }

    #[test]
    fn identity_uses_first_forwarded_hop_when_trusted() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(" 1.2.3.4 , 10.0.0.1"));
        assert_eq!(client_identity(&headers, peer(), true), "1.2.3.4");
        assert_eq!(client_identity(&HeaderMap::new(), peer(), true), "198.51.100.4");
    }

    #[test]
    fn extracts_access_token_and_origin() {
        let request = Request::builder()
            .uri("/admin/status?foo=bar&accessToken=S%20ECRET")
            .header("Origin", "https://app.example.com")
            .body(Body::empty())
            .unwrap();

        let ctx = request_context(&request, peer(), false);
        assert_eq!(ctx.access_token.as_deref(), Some("S ECRET"));
        assert_eq!(ctx.origin.as_deref(), Some("https://app.example.com"));
        assert_eq!(ctx.path, "/admin/status");
        assert!(ctx.preflight.is_none());
    }

    #[test]
    fn missing_query_means_no_token() {
        let request = Request::builder().uri("/admin").body(Body::empty()).unwrap();
        assert!(request_context(&request, peer(), false).access_token.is_none());
    }

    #[test]
    fn detects_preflight() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/items")
            .header("Origin", "https://app.example.com")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .body(Body::empty())
            .unwrap();

        let ctx = request_context(&request, peer(), false);
        assert_eq!(
            ctx.preflight,
            Some(Preflight {
                request_headers: Some("content-type".to_string())
            })
        );

        let plain_options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/items")
            .body(Body::empty())
            .unwrap();
        assert!(request_context(&plain_options, peer(), false).preflight.is_none());
    }

    #[test]
    fn context_debug_redacts_token() {
        let request = Request::builder()
            .uri("/admin?accessToken=SECRET")
            .body(Body::empty())
            .unwrap();
        let rendered = format!("{:?}", request_context(&request, peer(), false));
        assert!(!rendered.contains("SECRET"));
    }
}
