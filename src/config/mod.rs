//! Static policy store.
//!
//! # Data Flow
//! ```text
//! .env + GATEKEEPER_CONFIG (TOML, optional)
//!     → loader.rs (parse, apply environment overrides)
//!     → validation.rs (semantic checks, all errors collected)
//!     → PolicyConfig (validated, immutable)
//!     → shared via Arc with the admission gate and HTTP layer
//! ```
//!
//! # Design Decisions
//! - Loaded exactly once at startup; changes require a restart
//! - All fields have defaults so an empty environment is a valid policy
//! - Request handling never reads the environment

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, load_from, ConfigError};
pub use schema::{
    AdminConfig, CorsConfig, DatabaseConfig, LogFormat, ObservabilityConfig, OriginPolicy,
    PolicyConfig, RateLimitConfig, SecurityHeadersConfig, ServerConfig,
};
pub use validation::ValidationError;

impl PolicyConfig {
    /// Load the process-wide policy. See [`loader::load`].
    pub fn load() -> Result<Self, ConfigError> {
        loader::load()
    }
}
