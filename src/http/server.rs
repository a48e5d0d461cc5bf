//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router (health, admin, JSON fallback)
//! - Put every route behind the admission gate
//! - Wire up tower middleware (request ID, tracing, timeout)
//! - Sweep expired rate-limit counters in the background
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{body::Body, http::Request, routing::get, Json, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{setup_admin_router, AdminState};
use crate::config::PolicyConfig;
use crate::gate::AdmissionGate;
use crate::http::middleware::protect;
use crate::http::request::UuidRequestId;
use crate::http::response::not_found;
use crate::observability::metrics;

/// HTTP front end for the gatekeeper.
pub struct HttpServer {
    router: Router,
    gate: Arc<AdmissionGate>,
}

impl HttpServer {
    pub fn new(config: PolicyConfig) -> Self {
        let gate = Arc::new(AdmissionGate::new(&config));
        Self::with_gate(config, gate)
    }

    /// Build around an existing gate (e.g. one driven by a manual clock).
    pub fn with_gate(config: PolicyConfig, gate: Arc<AdmissionGate>) -> Self {
        let config = Arc::new(config);
        let admin_state = AdminState {
            config: config.clone(),
            gate: gate.clone(),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, gate.clone(), admin_state);
        Self { router, gate }
    }

    #[allow(deprecated)]
    fn build_router(config: &PolicyConfig, gate: Arc<AdmissionGate>, admin: AdminState) -> Router {
        let mut app = Router::new().route("/health", get(health));

        // Admin endpoints live under the first admin prefix; with none configured
        // they are not exposed at all.
        if let Some(prefix) = config.admin.route_prefixes.first() {
            let prefix = prefix.trim_end_matches('/');
            let admin_router = setup_admin_router(admin);
            app = if prefix.is_empty() {
                app.merge(admin_router)
            } else {
                app.nest(prefix, admin_router)
            };
        }

        let app = app
            .fallback(not_found)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )));

        // Spans carry the path only; the query may hold the admin secret.
        let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        });

        protect(app, gate)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(trace)
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// A clone of the fully-layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let sweeper = spawn_sweeper(self.gate.clone());
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(handle) = sweeper {
            handle.abort();
        }
        tracing::info!("HTTP server stopped");
        result
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Periodically drop counters whose window has closed.
fn spawn_sweeper(gate: Arc<AdmissionGate>) -> Option<JoinHandle<()>> {
    let period = gate.limiter()?.window();
    if period.is_zero() {
        return None;
    }

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Some(limiter) = gate.limiter() {
                let purged = limiter.purge_expired();
                let remaining = limiter.tracked_identities();
                if purged > 0 {
                    tracing::debug!(purged, remaining, "Swept expired rate-limit counters");
                }
                metrics::record_sweep(purged, remaining);
            }
        }
    }))
}
