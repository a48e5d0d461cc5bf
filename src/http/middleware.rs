//! Admission middleware.
//!
//! Runs the gate in front of every route, then decorates the outgoing
//! response with the admission headers whatever the verdict was.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};

use crate::gate::{AdmissionGate, Verdict};
use crate::http::request::request_context;
use crate::http::response::apply_headers;
use crate::observability::metrics;

pub async fn admission_middleware(
    State(gate): State<Arc<AdmissionGate>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = request_context(&request, peer, gate.trust_forwarded_for());
    let admission = gate.evaluate(&ctx);
    metrics::record_admission(&admission.verdict);

    let mut response = match &admission.verdict {
        Verdict::Allow => next.run(request).await,
        Verdict::Preflight(status) => status.into_response(),
        Verdict::Reject(rejection) => rejection.clone().into_response(),
    };

    gate.settle(&ctx, &admission, response.status());
    apply_headers(&mut response, admission.headers, gate.hide_powered_by());
    response
}

/// Put `router` behind the gate. Requires the server to be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn protect(router: Router, gate: Arc<AdmissionGate>) -> Router {
    router.layer(middleware::from_fn_with_state(gate, admission_middleware))
}
