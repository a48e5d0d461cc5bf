//! Route access classification.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Prefixes match on segment boundaries: `/admin` covers `/admin` and
//!   `/admin/x`, not `/administrator`
//! - No regex, linear in the number of prefixes

use crate::config::schema::AdminConfig;

/// Whether a route needs the admin secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    AdminOnly,
}

/// Matches a path against one prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        match path.strip_prefix(&self.prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Classifies request paths as public or admin-only.
#[derive(Debug, Clone, Default)]
pub struct AccessMatcher {
    admin: Vec<PathPrefixMatcher>,
}

impl AccessMatcher {
    pub fn new<I, S>(admin_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admin: admin_prefixes.into_iter().map(PathPrefixMatcher::new).collect(),
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.route_prefixes.iter().cloned())
    }

    pub fn classify(&self, path: &str) -> RouteAccess {
        if self.admin.iter().any(|m| m.matches(path)) {
            RouteAccess::AdminOnly
        } else {
            RouteAccess::Public
        }
    }
}
