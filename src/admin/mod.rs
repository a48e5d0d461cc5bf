//! Admin-only endpoints.
//!
//! These routes carry no guard of their own: they are mounted under an
//! admin prefix, and the admission gate requires the shared secret there.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;

pub use self::handlers::AdminState;

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/status", get(get_status))
        .route("/policy", get(get_policy))
        .route("/rate-limits", get(get_rate_limits))
        .with_state(state)
}
