use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::schema::{OriginPolicy, PolicyConfig};
use crate::gate::AdmissionGate;

/// Shared state for admin endpoints.
#[derive(Clone)]
pub struct AdminState {
    pub config: Arc<PolicyConfig>,
    pub gate: Arc<AdmissionGate>,
    pub started_at: Instant,
}

#[derive(Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySummary {
    pub server: ServerSummary,
    pub cors: CorsSummary,
    pub rate_limit: RateLimitSummary,
    pub admin: AdminSummary,
    pub database: DatabaseSummary,
}

#[derive(Serialize)]
pub struct ServerSummary {
    pub host: String,
    pub port: u16,
}

#[derive(Serialize)]
pub struct CorsSummary {
    pub mode: &'static str,
    pub origins: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitSummary {
    pub enabled: bool,
    pub window_ms: u64,
    pub max_requests: u32,
    pub status_code: u16,
    pub tracked_identities: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub secret_configured: bool,
    pub route_prefixes: Vec<String>,
}

/// Connection target only; credentials are never reported.
#[derive(Serialize)]
pub struct DatabaseSummary {
    pub host: String,
    pub port: u16,
    pub database: Option<String>,
    pub ssl: bool,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

pub async fn get_policy(State(state): State<AdminState>) -> Json<PolicySummary> {
    let config = &state.config;
    let (mode, origins) = match &config.cors.policy {
        OriginPolicy::Unrestricted => ("unrestricted", Vec::new()),
        OriginPolicy::Any => ("any", Vec::new()),
        OriginPolicy::List(origins) => ("list", origins.clone()),
    };

    Json(PolicySummary {
        server: ServerSummary {
            host: config.server.host.clone(),
            port: config.server.port,
        },
        cors: CorsSummary { mode, origins },
        rate_limit: rate_limit_summary(&state),
        admin: AdminSummary {
            secret_configured: state.gate.admin_configured(),
            route_prefixes: config.admin.route_prefixes.clone(),
        },
        database: DatabaseSummary {
            host: config.database.host.clone(),
            port: config.database.port,
            database: config.database.database.clone(),
            ssl: config.database.ssl,
        },
    })
}

pub async fn get_rate_limits(State(state): State<AdminState>) -> Json<RateLimitSummary> {
    Json(rate_limit_summary(&state))
}

fn rate_limit_summary(state: &AdminState) -> RateLimitSummary {
    let rate = &state.config.rate_limit;
    RateLimitSummary {
        enabled: rate.enabled,
        window_ms: rate.window_ms,
        max_requests: rate.max_requests,
        status_code: rate.status_code,
        tracked_identities: state
            .gate
            .limiter()
            .map(|l| l.tracked_identities())
            .unwrap_or(0),
    }
}
