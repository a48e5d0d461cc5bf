//! Shared-secret guard for admin-restricted routes.

use crate::config::schema::AdminConfig;

/// Outcome of the admin check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAccess {
    Allowed,
    Denied,
}

impl AdminAccess {
    pub fn is_allowed(self) -> bool {
        self == AdminAccess::Allowed
    }
}

/// Compares the `accessToken` query value against the configured secret.
#[derive(Clone)]
pub struct AdminGuard {
    secret: Option<String>,
}

impl AdminGuard {
    pub fn new(config: &AdminConfig) -> Self {
        Self {
            secret: config.access_token.clone().filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Allowed only when a secret is configured, a token is supplied, and they
    /// are byte-for-byte equal.
    pub fn check(&self, supplied: Option<&str>) -> AdminAccess {
        match (self.secret.as_deref(), supplied) {
            (Some(secret), Some(token)) if !token.is_empty() && token == secret => {
                AdminAccess::Allowed
            }
            _ => AdminAccess::Denied,
        }
    }
}

impl std::fmt::Debug for AdminGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGuard")
            .field("configured", &self.is_configured())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(secret: Option<&str>) -> AdminGuard {
        AdminGuard::new(&AdminConfig {
            access_token: secret.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn unset_secret_always_denies() {
        let guard = guard(None);
        assert!(!guard.is_configured());
        assert_eq!(guard.check(None), AdminAccess::Denied);
        assert_eq!(guard.check(Some("")), AdminAccess::Denied);
        assert_eq!(guard.check(Some("anything")), AdminAccess::Denied);
    }

    #[test]
    fn empty_secret_is_unset() {
        let guard = guard(Some(""));
        assert!(!guard.is_configured());
        assert_eq!(guard.check(Some("")), AdminAccess::Denied);
    }

    #[test]
    fn exact_match_allows() {
        assert_eq!(guard(Some("SECRET")).check(Some("SECRET")), AdminAccess::Allowed);
    }

    #[test]
    fn any_difference_denies() {
        let guard = guard(Some("SECRET"));
        for candidate in ["secret", "SECRET ", " SECRET", "SECRE", "SECRETS", "SECRÉT"] {
            assert_eq!(guard.check(Some(candidate)), AdminAccess::Denied, "{:?}", candidate);
        }
    }

    #[test]
    fn missing_token_denies() {
        assert_eq!(guard(Some("SECRET")).check(None), AdminAccess::Denied);
    }

    #[test]
    fn repeated_checks_are_stable() {
        let guard = guard(Some("SECRET"));
        for _ in 0..5 {
            assert!(guard.check(Some("SECRET")).is_allowed());
        }
    }

    #[test]
    fn debug_hides_secret() {
        assert!(!format!("{:?}", guard(Some("SECRET"))).contains("SECRET"));
    }
}
