//! Routing subsystem.
//!
//! The gatekeeper does not own route design; it only needs to know which
//! paths are admin-restricted.
//!
//! # Data Flow
//! ```text
//! Request path
//!     → matcher.rs (segment-aware prefix match)
//!     → RouteAccess::{Public, AdminOnly}
//!     → gate decides whether the admin check runs
//! ```

pub mod matcher;

pub use matcher::{AccessMatcher, PathPrefixMatcher, RouteAccess};
