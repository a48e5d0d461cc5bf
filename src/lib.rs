//! Request admission layer for a web API: security headers, CORS, per-client
//! rate limiting, and a shared-secret guard for admin routes.

pub mod admin;
pub mod config;
pub mod gate;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::PolicyConfig;
pub use gate::{AdmissionGate, Verdict};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
