//! Policy validation.
//!
//! Serde handles syntax; this module checks value ranges and that every
//! header the policy will emit is a legal header value. All errors are
//! collected, not just the first.

use axum::http::{HeaderValue, Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::config::schema::{OriginPolicy, PolicyConfig};
use crate::security::headers::SecurityHeaders;

/// A single semantic problem with the policy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("server.port must be non-zero")]
    ZeroPort,

    #[error("rate_limit.window_ms must be non-zero")]
    ZeroWindow,

    #[error("rate_limit.max_requests must be at least 1")]
    ZeroThreshold,

    #[error("{field} = {code} is not a client or server error status")]
    BadStatus { field: &'static str, code: u16 },

    #[error("cors.preflight_status = {0} is not a success status")]
    BadPreflightStatus(u16),

    #[error("invalid header value for {0}")]
    BadHeader(String),

    #[error("invalid CORS origin {0:?}")]
    BadOrigin(String),

    #[error("invalid HTTP method {0:?} in cors.allowed_methods")]
    BadMethod(String),

    #[error("admin.require_access_token is set but no ADMIN_ACCESS_TOKEN is configured")]
    MissingAdminToken,

    #[error("admin route prefix {0:?} must start with '/'")]
    BadAdminPrefix(String),
}

/// Validate a fully-assembled policy.
pub fn validate_config(config: &PolicyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    let rate = &config.rate_limit;
    if rate.window_ms == 0 {
        errors.push(ValidationError::ZeroWindow);
    }
    if rate.max_requests == 0 {
        errors.push(ValidationError::ZeroThreshold);
    }
    if !is_error_status(rate.status_code) {
        errors.push(ValidationError::BadStatus {
            field: "rate_limit.status_code",
            code: rate.status_code,
        });
    }

    if let Err(name) = SecurityHeaders::try_from_config(&config.headers) {
        errors.push(ValidationError::BadHeader(name));
    }

    let cors = &config.cors;
    if let OriginPolicy::List(origins) = &cors.policy {
        for origin in origins {
            if !is_valid_origin(origin) {
                errors.push(ValidationError::BadOrigin(origin.clone()));
            }
        }
    }
    for method in &cors.allowed_methods {
        if Method::from_bytes(method.as_bytes()).is_err() {
            errors.push(ValidationError::BadMethod(method.clone()));
        }
    }
    for name in &cors.allowed_headers {
        if HeaderValue::from_str(name).is_err() {
            errors.push(ValidationError::BadHeader(format!("cors.allowed_headers: {}", name)));
        }
    }
    if !StatusCode::from_u16(cors.preflight_status).is_ok_and(|s| s.is_success()) {
        errors.push(ValidationError::BadPreflightStatus(cors.preflight_status));
    }

    let admin = &config.admin;
    if admin.require_access_token && admin.access_token.as_deref().unwrap_or("").is_empty() {
        errors.push(ValidationError::MissingAdminToken);
    }
    for prefix in &admin.route_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::BadAdminPrefix(prefix.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_error_status(code: u16) -> bool {
    (400..=599).contains(&code)
}

/// An origin is `scheme://host[:port]` with nothing after it.
fn is_valid_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => {
            url.host_str().is_some()
                && url.path() == "/"
                && url.query().is_none()
                && !origin.ends_with('/')
                && HeaderValue::from_str(origin).is_ok()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert!(validate_config(&PolicyConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = PolicyConfig::default();
        config.server.port = 0;
        config.rate_limit.window_ms = 0;
        config.rate_limit.max_requests = 0;
        config.rate_limit.status_code = 200;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::ZeroPort));
        assert!(errors.contains(&ValidationError::ZeroWindow));
        assert!(errors.contains(&ValidationError::ZeroThreshold));
    }

    #[test]
    fn rejects_malformed_origins() {
        let mut config = PolicyConfig::default();
        config.cors.policy = OriginPolicy::List(vec![
            "https://ok.example".to_string(),
            "not an origin".to_string(),
            "https://with.path/api".to_string(),
        ]);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::BadOrigin("not an origin".to_string()),
                ValidationError::BadOrigin("https://with.path/api".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_header_values_with_control_characters() {
        let mut config = PolicyConfig::default();
        config.headers.x_frame_options = "DENY\r\nX-Injected: 1".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BadHeader(_)));
    }

    #[test]
    fn admin_prefix_must_be_absolute() {
        let mut config = PolicyConfig::default();
        config.admin.route_prefixes = vec!["admin".to_string()];
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::BadAdminPrefix("admin".to_string())]
        );
    }
}
