//! Admission gate.
//!
//! # Data Flow
//! ```text
//! RequestContext
//!     → security headers (always attached)
//!     → CORS origin policy      ── denied ──→ Reject(403)
//!                               ── preflight → Preflight(204)
//!     → rate limit              ── over ────→ Reject(configured status)
//!     → admin secret (admin routes only) ──→ Reject(403)
//!     → Allow
//! ```
//!
//! # Design Decisions
//! - Steps run in a fixed order and stop at the first rejection
//! - A rejection is a value, never an error
//! - Constant work per request, no I/O, no awaits

pub mod context;
pub mod verdict;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};

use crate::config::schema::PolicyConfig;
use crate::routing::{AccessMatcher, RouteAccess};
use crate::security::{
    AdminGuard, Clock, CorsDecision, CorsGuard, FixedWindowLimiter, SecurityHeaders, SystemClock,
};

pub use context::RequestContext;
pub use verdict::{Admission, RejectReason, Rejection, Verdict};

/// Evaluates every inbound request against the static policy.
#[derive(Debug)]
pub struct AdmissionGate {
    headers: SecurityHeaders,
    cors: CorsGuard,
    preflight_status: StatusCode,
    limiter: Option<FixedWindowLimiter>,
    rate_rejection: Rejection,
    skip_successful_requests: bool,
    skip_failed_requests: bool,
    trust_forwarded_for: bool,
    admin: AdminGuard,
    routes: AccessMatcher,
}

impl AdmissionGate {
    pub fn new(config: &PolicyConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &PolicyConfig, clock: Arc<dyn Clock>) -> Self {
        let rate = &config.rate_limit;
        let rate_status = StatusCode::from_u16(rate.status_code).unwrap_or(StatusCode::FORBIDDEN);

        Self {
            headers: SecurityHeaders::from_config(&config.headers),
            cors: CorsGuard::new(&config.cors),
            preflight_status: StatusCode::from_u16(config.cors.preflight_status)
                .unwrap_or(StatusCode::NO_CONTENT),
            limiter: rate
                .enabled
                .then(|| FixedWindowLimiter::new(rate, clock)),
            rate_rejection: Rejection::new(rate_status, rate.message.clone(), RejectReason::RateLimit),
            skip_successful_requests: rate.skip_successful_requests,
            skip_failed_requests: rate.skip_failed_requests,
            trust_forwarded_for: rate.trust_forwarded_for,
            admin: AdminGuard::new(&config.admin),
            routes: AccessMatcher::from_config(&config.admin),
        }
    }

    /// Run every step for one request.
    pub fn evaluate(&self, ctx: &RequestContext) -> Admission {
        let mut headers = self.headers.headers().clone();

        match self.cors.decide(ctx.origin.as_deref(), ctx.preflight.as_ref()) {
            CorsDecision::Continue(cors_headers) => headers.extend(cors_headers),
            CorsDecision::Preflight(cors_headers) => {
                headers.extend(cors_headers);
                return Admission {
                    verdict: Verdict::Preflight(self.preflight_status),
                    headers,
                    counted: false,
                };
            }
            CorsDecision::Denied => {
                tracing::info!(
                    client = %ctx.client,
                    origin = ctx.origin.as_deref().unwrap_or_default(),
                    "Cross-origin request denied"
                );
                return reject(headers, Rejection::origin_not_allowed(), false);
            }
        }

        let counted = if let Some(limiter) = &self.limiter {
            let decision = limiter.hit(&ctx.client);
            headers.extend(limiter.headers(&decision));
            if !decision.allowed {
                tracing::warn!(client = %ctx.client, limit = decision.limit, "Rate limit exceeded");
                return reject(headers, self.rate_rejection.clone(), true);
            }
            true
        } else {
            false
        };

        if self.routes.classify(&ctx.path) == RouteAccess::AdminOnly {
            let access = self.admin.check(ctx.access_token.as_deref());
            if !access.is_allowed() {
                tracing::info!(
                    client = %ctx.client,
                    path = %ctx.path,
                    token_supplied = ctx.access_token.is_some(),
                    secret_configured = self.admin.is_configured(),
                    "Admin access denied"
                );
                return reject(headers, Rejection::admin_forbidden(), counted);
            }
            tracing::debug!(client = %ctx.client, path = %ctx.path, "Admin access granted");
        }

        Admission {
            verdict: Verdict::Allow,
            headers,
            counted,
        }
    }

    /// Post-response hook: refunds the rate-limit hit when the response
    /// status falls in a class the policy does not count.
    pub fn settle(&self, ctx: &RequestContext, admission: &Admission, status: StatusCode) {
        let Some(limiter) = &self.limiter else {
            return;
        };
        if !admission.counted {
            return;
        }

        let failed = status.is_client_error() || status.is_server_error();
        if (failed && self.skip_failed_requests) || (!failed && self.skip_successful_requests) {
            limiter.refund(&ctx.client);
        }
    }

    pub fn limiter(&self) -> Option<&FixedWindowLimiter> {
        self.limiter.as_ref()
    }

    pub fn route_access(&self, path: &str) -> RouteAccess {
        self.routes.classify(path)
    }

    pub fn trust_forwarded_for(&self) -> bool {
        self.trust_forwarded_for
    }

    pub fn hide_powered_by(&self) -> bool {
        self.headers.hide_powered_by()
    }

    pub fn admin_configured(&self) -> bool {
        self.admin.is_configured()
    }
}

fn reject(headers: HeaderMap, rejection: Rejection, counted: bool) -> Admission {
    Admission {
        verdict: Verdict::Reject(rejection),
        headers,
        counted,
    }
}
