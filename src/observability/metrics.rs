//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gatekeeper_admissions_total` (counter): verdicts by `outcome` and `reason`
//! - `gatekeeper_rate_limit_identities` (gauge): live rate-limit counters
//! - `gatekeeper_rate_limit_purged_total` (counter): counters dropped by the sweeper
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::gate::Verdict;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_admission(verdict: &Verdict) {
    let (outcome, reason) = match verdict {
        Verdict::Allow => ("allowed", "none"),
        Verdict::Preflight(_) => ("preflight", "none"),
        Verdict::Reject(rejection) => ("rejected", rejection.reason.as_str()),
    };
    metrics::counter!(
        "gatekeeper_admissions_total",
        "outcome" => outcome,
        "reason" => reason
    )
    .increment(1);
}

pub fn record_sweep(purged: usize, remaining: usize) {
    metrics::counter!("gatekeeper_rate_limit_purged_total").increment(purged as u64);
    metrics::gauge!("gatekeeper_rate_limit_identities").set(remaining as f64);
}
