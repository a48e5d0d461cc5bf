//! API gatekeeper.
//!
//! Every inbound request passes the admission gate before any handler runs.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                  GATEKEEPER                   │
//!   Client Request   │  ┌────────┐   ┌────────────────────────────┐  │
//!   ─────────────────┼─▶│  http  │──▶│       admission gate       │  │
//!                    │  │ server │   │ headers → cors → rate → admin │
//!                    │  └────────┘   └─────────────┬──────────────┘  │
//!                    │                 allow │     │ reject          │
//!                    │                       ▼     ▼                 │
//!   Client Response  │              ┌─────────┐ ┌──────────────┐    │
//!   ◀────────────────┼──────────────│ handler │ │ {message,    │    │
//!                    │              └─────────┘ │  statusCode} │    │
//!                    │                          └──────────────┘    │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │ config (loaded once) · observability ·  │  │
//!                    │  │ lifecycle (signals, graceful shutdown)  │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └───────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

use api_gatekeeper::lifecycle::startup;

#[tokio::main]
async fn main() -> ExitCode {
    match startup::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Logging may not be initialised yet when the policy fails to load.
            eprintln!("gatekeeper failed to start: {}", e);
            ExitCode::FAILURE
        }
    }
}
