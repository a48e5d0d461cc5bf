//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing)
//!     → request.rs (client identity, origin, accessToken)
//!     → middleware.rs (admission gate verdict)
//!     → handler, or response.rs rejection body
//!     → response.rs (admission headers merged)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use middleware::{admission_middleware, protect};
pub use request::{request_context, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
