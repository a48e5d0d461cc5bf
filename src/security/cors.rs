//! Cross-origin admission.
//!
//! `Unrestricted` mirrors a deployment where CORS processing is switched off:
//! nothing is checked and no CORS headers are emitted. `Any` and `List`
//! answer preflights themselves and decorate simple requests.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::config::schema::{CorsConfig, OriginPolicy};

/// An `OPTIONS` request carrying `Access-Control-Request-Method`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Preflight {
    /// Raw `Access-Control-Request-Headers`, if sent.
    pub request_headers: Option<String>,
}

/// Outcome of the CORS step.
#[derive(Debug, Clone)]
pub enum CorsDecision {
    /// Keep evaluating; attach these headers to the response.
    Continue(HeaderMap),
    /// Answer the preflight immediately with these headers.
    Preflight(HeaderMap),
    /// The origin is not on the allow list.
    Denied,
}

#[derive(Debug, Clone)]
pub struct CorsGuard {
    policy: OriginPolicy,
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
}

impl CorsGuard {
    pub fn new(config: &CorsConfig) -> Self {
        let join = |items: &[String]| {
            if items.is_empty() {
                None
            } else {
                HeaderValue::from_str(&items.join(",")).ok()
            }
        };

        Self {
            policy: config.policy.clone(),
            allow_methods: join(&config.allowed_methods),
            allow_headers: join(&config.allowed_headers),
            allow_credentials: config.allow_credentials,
            max_age: config.max_age_secs.map(HeaderValue::from),
        }
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    pub fn decide(&self, origin: Option<&str>, preflight: Option<&Preflight>) -> CorsDecision {
        let allow_origin = match (&self.policy, origin) {
            (OriginPolicy::Unrestricted, _) => return CorsDecision::Continue(HeaderMap::new()),
            (OriginPolicy::Any, Some(origin)) if self.allow_credentials => {
                match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => return CorsDecision::Denied,
                }
            }
            (OriginPolicy::Any, _) => Some(HeaderValue::from_static("*")),
            (OriginPolicy::List(_), None) => None,
            (OriginPolicy::List(allowed), Some(origin)) => {
                if !allowed.iter().any(|a| origin_matches(a, origin)) {
                    return CorsDecision::Denied;
                }
                match HeaderValue::from_str(origin) {
                    Ok(v) => Some(v),
                    Err(_) => return CorsDecision::Denied,
                }
            }
        };

        let mut headers = HeaderMap::new();
        if let Some(value) = allow_origin {
            if value != "*" {
                headers.insert(header::VARY, HeaderValue::from_static("Origin"));
            }
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            if self.allow_credentials {
                headers.insert(
                    header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                    HeaderValue::from_static("true"),
                );
            }
        }

        match preflight {
            None => CorsDecision::Continue(headers),
            Some(preflight) => {
                if let Some(methods) = &self.allow_methods {
                    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
                }
                let allow_headers = self.allow_headers.clone().or_else(|| {
                    preflight
                        .request_headers
                        .as_deref()
                        .and_then(|h| HeaderValue::from_str(h).ok())
                });
                if let Some(value) = allow_headers {
                    if self.allow_headers.is_none() {
                        headers.append(
                            header::VARY,
                            HeaderValue::from_static("Access-Control-Request-Headers"),
                        );
                    }
                    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, value);
                }
                if let Some(max_age) = &self.max_age {
                    headers.insert(header::ACCESS_CONTROL_MAX_AGE, max_age.clone());
                }
                CorsDecision::Preflight(headers)
            }
        }
    }
}

/// Scheme and host compare case-insensitively; a trailing slash is ignored.
fn origin_matches(allowed: &str, origin: &str) -> bool {
    allowed
        .trim_end_matches('/')
        .eq_ignore_ascii_case(origin.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(policy: OriginPolicy) -> CorsGuard {
        CorsGuard::new(&CorsConfig {
            policy,
            ..Default::default()
        })
    }

    fn list() -> OriginPolicy {
        OriginPolicy::List(vec!["https://app.example.com".to_string()])
    }

    #[test]
    fn unrestricted_admits_everything_without_headers() {
        let guard = guard(OriginPolicy::Unrestricted);

        match guard.decide(Some("https://evil.example"), None) {
            CorsDecision::Continue(headers) => assert!(headers.is_empty()),
            other => panic!("unexpected decision: {:?}", other),
        }
        // Preflights fall through to the application.
        assert!(matches!(
            guard.decide(Some("https://evil.example"), Some(&Preflight::default())),
            CorsDecision::Continue(_)
        ));
    }

    #[test]
    fn any_sends_wildcard() {
        match guard(OriginPolicy::Any).decide(Some("https://evil.example"), None) {
            CorsDecision::Continue(headers) => {
                assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
                assert!(headers.get(header::VARY).is_none());
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn list_reflects_allowed_origin() {
        match guard(list()).decide(Some("https://APP.example.com"), None) {
            CorsDecision::Continue(headers) => {
                assert_eq!(
                    headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                    "https://APP.example.com"
                );
                assert_eq!(headers[header::VARY], "Origin");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn list_denies_unknown_origin() {
        assert!(matches!(
            guard(list()).decide(Some("https://evil.example"), None),
            CorsDecision::Denied
        ));
    }

    #[test]
    fn list_admits_requests_without_origin() {
        match guard(list()).decide(None, None) {
            CorsDecision::Continue(headers) => assert!(headers.is_empty()),
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn preflight_reflects_request_headers() {
        let preflight = Preflight {
            request_headers: Some("content-type,x-custom".to_string()),
        };

        match guard(list()).decide(Some("https://app.example.com"), Some(&preflight)) {
            CorsDecision::Preflight(headers) => {
                assert_eq!(
                    headers[header::ACCESS_CONTROL_ALLOW_METHODS],
                    "GET,HEAD,PUT,PATCH,POST,DELETE"
                );
                assert_eq!(
                    headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
                    "content-type,x-custom"
                );
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }

    #[test]
    fn credentials_with_any_reflect_origin() {
        let guard = CorsGuard::new(&CorsConfig {
            policy: OriginPolicy::Any,
            allow_credentials: true,
            ..Default::default()
        });

        match guard.decide(Some("https://app.example.com"), None) {
            CorsDecision::Continue(headers) => {
                assert_eq!(
                    headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
                    "https://app.example.com"
                );
                assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
            }
            other => panic!("unexpected decision: {:?}", other),
        }
    }
}
