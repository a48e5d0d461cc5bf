//! Policy schema definitions.
//!
//! This module defines the complete policy structure for the gatekeeper.
//! All types derive Serde traits for deserialization from TOML files.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Root policy for the gatekeeper. Built once at startup, never mutated.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PolicyConfig {
    /// Listener settings.
    pub server: ServerConfig,

    /// Security response headers.
    pub headers: SecurityHeadersConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Per-client rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Admin shared-secret guard.
    pub admin: AdminConfig,

    /// Storage backend connection settings.
    pub database: DatabaseConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Total time allowed per request, in seconds.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3000,
            request_timeout_secs: 30,
        }
    }
}

/// Security header policy.
///
/// String-valued headers are disabled by setting them to an empty string.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityHeadersConfig {
    pub content_security_policy: Option<ContentSecurityPolicyConfig>,
    pub cross_origin_embedder_policy: String,
    pub cross_origin_opener_policy: String,
    pub cross_origin_resource_policy: String,
    pub origin_agent_cluster: bool,
    /// Joined with `,` in the `Referrer-Policy` header.
    pub referrer_policy: Vec<String>,
    pub strict_transport_security: Option<HstsConfig>,
    pub x_content_type_options: bool,
    /// `Some(true)` => `on`, `Some(false)` => `off`, `None` => header omitted.
    pub x_dns_prefetch_control: Option<bool>,
    pub x_download_options: bool,
    pub x_frame_options: String,
    pub x_permitted_cross_domain_policies: String,
    pub x_xss_protection: bool,
    /// Strip `X-Powered-By` from downstream responses.
    pub hide_powered_by: bool,
}

impl Default for SecurityHeadersConfig {
    fn default() -> Self {
        Self {
            content_security_policy: Some(ContentSecurityPolicyConfig::default()),
            cross_origin_embedder_policy: "require-corp".to_string(),
            cross_origin_opener_policy: "same-origin-allow-popups".to_string(),
            cross_origin_resource_policy: "cross-origin".to_string(),
            origin_agent_cluster: true,
            referrer_policy: vec!["origin".to_string(), "unsafe-url".to_string()],
            strict_transport_security: Some(HstsConfig::default()),
            x_content_type_options: true,
            x_dns_prefetch_control: Some(false),
            x_download_options: false,
            x_frame_options: "DENY".to_string(),
            x_permitted_cross_domain_policies: "by-content-type".to_string(),
            x_xss_protection: true,
            hide_powered_by: true,
        }
    }
}

/// Content-Security-Policy directives, keyed by kebab-case directive name.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentSecurityPolicyConfig {
    pub directives: BTreeMap<String, Vec<String>>,
    pub report_only: bool,
}

impl Default for ContentSecurityPolicyConfig {
    fn default() -> Self {
        let directives = [
            directive("default-src", &["'self'", "www.pgmain.com"]),
            directive("base-uri", &["'self'"]),
            directive("font-src", &["'self'", "fonts.google.com"]),
            directive("form-action", &["'self'", "www.pgmain2.com"]),
            directive("frame-ancestors", &["'self'", "www.pgmain.com", "www.pgmain2.com"]),
            directive("img-src", &["'self'", "data:", "validator.swagger.io", "www.pgmain.com"]),
            directive("object-src", &["'none'"]),
            directive(
                "script-src",
                &["'self'", "https: 'unsafe-inline'", "www.pgmain.com", "cdn.jsdelivr.net"],
            ),
            directive("script-src-attr", &["'none'"]),
            directive("style-src", &["'self'", "'unsafe-inline'"]),
            directive("upgrade-insecure-requests", &[]),
        ]
        .into_iter()
        .collect();

        Self {
            directives,
            report_only: false,
        }
    }
}

fn directive(name: &str, values: &[&str]) -> (String, Vec<String>) {
    (
        name.to_string(),
        values.iter().map(|v| v.to_string()).collect(),
    )
}

/// Strict-Transport-Security settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HstsConfig {
    pub max_age_secs: u64,
    pub include_subdomains: bool,
    pub preload: bool,
}

impl Default for HstsConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 123_456,
            include_subdomains: false,
            preload: true,
        }
    }
}

/// Which cross-origin requests are admitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case", tag = "mode", content = "origins")]
pub enum OriginPolicy {
    /// No CORS processing at all: every origin passes, no CORS headers are sent.
    #[default]
    Unrestricted,
    /// Every origin passes and receives `Access-Control-Allow-Origin: *`.
    Any,
    /// Only the listed origins pass; others are rejected.
    List(Vec<String>),
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub policy: OriginPolicy,
    pub allowed_methods: Vec<String>,
    /// Empty means "reflect `Access-Control-Request-Headers`".
    pub allowed_headers: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: Option<u64>,
    pub preflight_status: u16,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            policy: OriginPolicy::Unrestricted,
            allowed_methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            allowed_headers: Vec::new(),
            allow_credentials: false,
            max_age_secs: None,
            preflight_status: 204,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,

    /// Window length in milliseconds. Each client's window starts at its first hit.
    pub window_ms: u64,

    /// Requests admitted per client per window.
    pub max_requests: u32,

    /// Status used for both the HTTP response and the `statusCode` body field.
    pub status_code: u16,

    /// Value of the `message` body field on rejection.
    pub message: String,

    /// Emit `RateLimit-*` headers.
    pub standard_headers: bool,

    /// Emit `X-RateLimit-*` headers.
    pub legacy_headers: bool,

    /// Refund hits whose response status is below 400.
    pub skip_successful_requests: bool,

    /// Refund hits whose response status is 400 or above.
    pub skip_failed_requests: bool,

    /// Key clients by the first `X-Forwarded-For` entry instead of the peer address.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_ms: 5_000,
            max_requests: 1,
            status_code: 403,
            message: "Too many requests".to_string(),
            standard_headers: true,
            legacy_headers: false,
            skip_successful_requests: false,
            skip_failed_requests: false,
            trust_forwarded_for: false,
        }
    }
}

/// Admin shared-secret configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Shared secret compared against the `accessToken` query parameter.
    pub access_token: Option<String>,

    /// Refuse to start when no access token is configured.
    pub require_access_token: bool,

    /// Path prefixes whose routes are admin-restricted.
    pub route_prefixes: Vec<String>,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            require_access_token: false,
            route_prefixes: vec!["/admin".to_string()],
        }
    }
}

impl fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("require_access_token", &self.require_access_token)
            .field("route_prefixes", &self.route_prefixes)
            .finish()
    }
}

/// Storage backend settings. The connection itself lives outside the gatekeeper.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub ssl: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 3306,
            username: None,
            password: None,
            database: None,
            ssl: false,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("ssl", &self.ssl)
            .finish()
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub log_level: String,
    pub log_format: LogFormat,
    pub metrics_enabled: bool,
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
