//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (via gate):
//!     → headers.rs (precomputed security headers, attached to every response)
//!     → cors.rs (origin policy, preflight answers)
//!     → rate_limit.rs (per-client fixed window)
//!     → admin.rs (shared-secret check on admin routes)
//! ```
//!
//! # Design Decisions
//! - Every check returns a value; nothing here raises for a denial
//! - Fail closed: an unset admin secret denies every admin request
//! - No secret or query string is ever logged

pub mod admin;
pub mod clock;
pub mod cors;
pub mod headers;
pub mod rate_limit;

pub use admin::{AdminAccess, AdminGuard};
pub use clock::{Clock, ManualClock, SystemClock};
pub use cors::{CorsDecision, CorsGuard, Preflight};
pub use headers::SecurityHeaders;
pub use rate_limit::{FixedWindowLimiter, RateLimitDecision};
