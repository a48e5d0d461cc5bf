//! Security response headers.
//!
//! # Responsibilities
//! - Render the configured header policy into a `HeaderMap` once at startup
//! - Hand a copy to every response, allowed or rejected
//!
//! # Design Decisions
//! - Values are validated up front; request handling never builds header strings
//! - A CSP with no directives is not emitted
//! - `X-Powered-By` removal is applied by the HTTP layer after the handler runs

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::schema::{ContentSecurityPolicyConfig, HstsConfig, SecurityHeadersConfig};

pub const X_POWERED_BY: HeaderName = HeaderName::from_static("x-powered-by");

/// Precomputed security header set.
#[derive(Debug, Clone, Default)]
pub struct SecurityHeaders {
    headers: HeaderMap,
    hide_powered_by: bool,
}

impl SecurityHeaders {
    /// Render the policy, failing with the offending header name on an illegal value.
    pub fn try_from_config(config: &SecurityHeadersConfig) -> Result<Self, String> {
        let mut headers = HeaderMap::new();

        for (name, value) in rendered(config) {
            let value = HeaderValue::from_str(&value).map_err(|_| name.as_str().to_string())?;
            headers.insert(name, value);
        }

        Ok(Self {
            headers,
            hide_powered_by: config.hide_powered_by,
        })
    }

    /// Render the policy, dropping any header whose value is illegal.
    pub fn from_config(config: &SecurityHeadersConfig) -> Self {
        let mut headers = HeaderMap::new();

        for (name, value) in rendered(config) {
            match HeaderValue::from_str(&value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => tracing::warn!(header = %name, "Dropping invalid security header"),
            }
        }

        Self {
            headers,
            hide_powered_by: config.hide_powered_by,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn hide_powered_by(&self) -> bool {
        self.hide_powered_by
    }
}

fn rendered(config: &SecurityHeadersConfig) -> Vec<(HeaderName, String)> {
    let mut out = Vec::new();

    if let Some(csp) = &config.content_security_policy {
        if let Some(value) = render_csp(csp) {
            let name = if csp.report_only {
                "content-security-policy-report-only"
            } else {
                "content-security-policy"
            };
            out.push((HeaderName::from_static(name), value));
        }
    }

    let mut push_str = |name: &'static str, value: &str| {
        if !value.is_empty() {
            out.push((HeaderName::from_static(name), value.to_string()));
        }
    };
    push_str("cross-origin-embedder-policy", &config.cross_origin_embedder_policy);
    push_str("cross-origin-opener-policy", &config.cross_origin_opener_policy);
    push_str("cross-origin-resource-policy", &config.cross_origin_resource_policy);
    push_str("referrer-policy", &config.referrer_policy.join(","));
    push_str("x-frame-options", &config.x_frame_options);
    push_str(
        "x-permitted-cross-domain-policies",
        &config.x_permitted_cross_domain_policies,
    );

    if config.origin_agent_cluster {
        out.push((HeaderName::from_static("origin-agent-cluster"), "?1".to_string()));
    }
    if let Some(hsts) = &config.strict_transport_security {
        out.push((HeaderName::from_static("strict-transport-security"), render_hsts(hsts)));
    }
    if config.x_content_type_options {
        out.push((HeaderName::from_static("x-content-type-options"), "nosniff".to_string()));
    }
    if let Some(allow) = config.x_dns_prefetch_control {
        let value = if allow { "on" } else { "off" };
        out.push((HeaderName::from_static("x-dns-prefetch-control"), value.to_string()));
    }
    if config.x_download_options {
        out.push((HeaderName::from_static("x-download-options"), "noopen".to_string()));
    }
    if config.x_xss_protection {
        out.push((HeaderName::from_static("x-xss-protection"), "0".to_string()));
    }

    out
}

fn render_csp(csp: &ContentSecurityPolicyConfig) -> Option<String> {
    if csp.directives.is_empty() {
        return None;
    }

    let rendered = csp
        .directives
        .iter()
        .map(|(name, values)| {
            if values.is_empty() {
                name.clone()
            } else {
                format!("{} {}", name, values.join(" "))
            }
        })
        .collect::<Vec<_>>()
        .join(";");

    Some(rendered)
}

fn render_hsts(hsts: &HstsConfig) -> String {
    let mut value = format!("max-age={}", hsts.max_age_secs);
    if hsts.include_subdomains {
        value.push_str("; includeSubDomains");
    }
    if hsts.preload {
        value.push_str("; preload");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(headers: &'a SecurityHeaders, name: &str) -> Option<&'a str> {
        headers.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn default_policy_headers() {
        let headers = SecurityHeaders::from_config(&SecurityHeadersConfig::default());

        assert_eq!(value(&headers, "cross-origin-embedder-policy"), Some("require-corp"));
        assert_eq!(
            value(&headers, "cross-origin-opener-policy"),
            Some("same-origin-allow-popups")
        );
        assert_eq!(value(&headers, "cross-origin-resource-policy"), Some("cross-origin"));
        assert_eq!(value(&headers, "origin-agent-cluster"), Some("?1"));
        assert_eq!(value(&headers, "referrer-policy"), Some("origin,unsafe-url"));
        assert_eq!(
            value(&headers, "strict-transport-security"),
            Some("max-age=123456; preload")
        );
        assert_eq!(value(&headers, "x-content-type-options"), Some("nosniff"));
        assert_eq!(value(&headers, "x-dns-prefetch-control"), Some("off"));
        assert_eq!(value(&headers, "x-frame-options"), Some("DENY"));
        assert_eq!(
            value(&headers, "x-permitted-cross-domain-policies"),
            Some("by-content-type")
        );
        assert_eq!(value(&headers, "x-xss-protection"), Some("0"));
        assert!(value(&headers, "x-download-options").is_none());
        assert!(headers.hide_powered_by());
    }

    #[test]
    fn csp_renders_directives_and_bare_flags() {
        let headers = SecurityHeaders::from_config(&SecurityHeadersConfig::default());
        let csp = value(&headers, "content-security-policy").unwrap();

        assert!(csp.contains("default-src 'self' www.pgmain.com"));
        assert!(csp.contains("object-src 'none'"));
        assert!(csp.contains("script-src 'self' https: 'unsafe-inline' www.pgmain.com cdn.jsdelivr.net"));
        assert!(csp.split(';').any(|d| d == "upgrade-insecure-requests"));
    }

    #[test]
    fn csp_report_only_switches_header() {
        let mut config = SecurityHeadersConfig::default();
        if let Some(csp) = config.content_security_policy.as_mut() {
            csp.report_only = true;
        }

        let headers = SecurityHeaders::from_config(&config);
        assert!(value(&headers, "content-security-policy").is_none());
        assert!(value(&headers, "content-security-policy-report-only").is_some());
    }

    #[test]
    fn empty_strings_disable_headers() {
        let config = SecurityHeadersConfig {
            x_frame_options: String::new(),
            referrer_policy: Vec::new(),
            content_security_policy: None,
            ..Default::default()
        };

        let headers = SecurityHeaders::from_config(&config);
        assert!(value(&headers, "x-frame-options").is_none());
        assert!(value(&headers, "referrer-policy").is_none());
        assert!(value(&headers, "content-security-policy").is_none());
    }

    #[test]
    fn illegal_value_is_reported_by_name() {
        let config = SecurityHeadersConfig {
            cross_origin_opener_policy: "same-origin\n".to_string(),
            ..Default::default()
        };

        assert_eq!(
            SecurityHeaders::try_from_config(&config).unwrap_err(),
            "cross-origin-opener-policy"
        );
        let lenient = SecurityHeaders::from_config(&config);
        assert!(value(&lenient, "cross-origin-opener-policy").is_none());
        assert!(value(&lenient, "x-frame-options").is_some());
    }
}
