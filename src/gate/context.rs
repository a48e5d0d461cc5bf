//! Per-request input to the gate.

use std::fmt;

use axum::http::Method;

use crate::security::cors::Preflight;

/// Everything the gate looks at for one request. Dropped when the request ends.
#[derive(Clone)]
pub struct RequestContext {
    /// Rate-limit key, normally the peer IP.
    pub client: String,
    pub method: Method,
    pub path: String,
    pub origin: Option<String>,
    pub preflight: Option<Preflight>,
    /// Value of the `accessToken` query parameter.
    pub access_token: Option<String>,
}

impl RequestContext {
    pub fn new(client: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            method,
            path: path.into(),
            origin: None,
            preflight: None,
            access_token: None,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_preflight(mut self, preflight: Preflight) -> Self {
        self.preflight = Some(preflight);
        self
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("client", &self.client)
            .field("method", &self.method)
            .field("path", &self.path)
            .field("origin", &self.origin)
            .field("preflight", &self.preflight.is_some())
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
