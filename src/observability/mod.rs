//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gate and HTTP layer produce:
//!     → logging.rs (structured events via tracing)
//!     → metrics.rs (admission counters, counter-table gauge)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through TraceLayer spans
//! - Secrets and query strings never reach a log line

pub mod logging;
pub mod metrics;
