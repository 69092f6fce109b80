//! PIN-based publisher role resolution
//!
//! A PIN is trimmed, hashed with SHA-256 and compared against the configured
//! reference digests in fixed priority order (admin, then user). Comparison is
//! exact and case-sensitive on the lowercase hex representation.

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::config::RolesConfig;
use crate::types::Role;

/// Result of authenticating a PIN
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(Role),
    Unauthenticated,
}

impl AuthOutcome {
    pub fn role(&self) -> Option<Role> {
        match self {
            AuthOutcome::Authenticated(role) => Some(*role),
            AuthOutcome::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Clone)]
struct RoleRule {
    role: Role,
    digest: String,
}

/// Resolves PINs to publisher roles
#[derive(Debug, Clone)]
pub struct RoleAuthenticator {
    rules: Vec<RoleRule>,
}

impl RoleAuthenticator {
    /// Build an authenticator from reference digests; a missing digest
    /// disables that role.
    pub fn new(admin_digest: Option<&str>, user_digest: Option<&str>) -> Self {
        let rules = [(Role::Admin, admin_digest), (Role::User, user_digest)]
            .into_iter()
            .filter_map(|(role, digest)| {
                let digest = digest?.trim();
                (!digest.is_empty()).then(|| RoleRule {
                    role,
                    digest: digest.to_string(),
                })
            })
            .collect();
        Self { rules }
    }

    pub fn from_config(roles: &RolesConfig) -> Self {
        Self::new(roles.admin_digest.as_deref(), roles.user_digest.as_deref())
    }

    /// Resolve a PIN to a role
    pub fn authenticate(&self, secret: &SecretString) -> AuthOutcome {
        let digest = digest_secret(secret.expose_secret());
        self.rules
            .iter()
            .find(|rule| rule.digest == digest)
            .map(|rule| AuthOutcome::Authenticated(rule.role))
            .unwrap_or(AuthOutcome::Unauthenticated)
    }

    /// Whether the PIN grants the admin role
    pub fn is_admin(&self, secret: &SecretString) -> bool {
        self.authenticate(secret) == AuthOutcome::Authenticated(Role::Admin)
    }
}

/// Lowercase SHA-256 hex digest of a trimmed secret
pub fn digest_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.trim().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pin(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn authenticator() -> RoleAuthenticator {
        RoleAuthenticator::new(Some(&digest_secret("1111")), Some(&digest_secret("2222")))
    }

    #[test]
    fn test_digest_is_known_sha256() {
        assert_eq!(
            digest_secret("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_digest_trims_secret() {
        assert_eq!(digest_secret("  1111\n"), digest_secret("1111"));
    }

    #[test]
    fn test_admin_and_user_resolution() {
        let auth = authenticator();
        assert_eq!(auth.authenticate(&pin("1111")), AuthOutcome::Authenticated(Role::Admin));
        assert_eq!(auth.authenticate(&pin("2222")), AuthOutcome::Authenticated(Role::User));
        assert_eq!(auth.authenticate(&pin("3333")), AuthOutcome::Unauthenticated);
    }

    #[test]
    fn test_admin_checked_first_when_digests_collide() {
        let d = digest_secret("same");
        let auth = RoleAuthenticator::new(Some(&d), Some(&d));
        assert_eq!(auth.authenticate(&pin("same")), AuthOutcome::Authenticated(Role::Admin));
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let upper = digest_secret("1111").to_uppercase();
        let auth = RoleAuthenticator::new(Some(&upper), None);
        assert_eq!(auth.authenticate(&pin("1111")), AuthOutcome::Unauthenticated);
    }

    #[test]
    fn test_no_prefix_matching() {
        let full = digest_secret("1111");
        let auth = RoleAuthenticator::new(Some(&full[..32]), None);
        assert_eq!(auth.authenticate(&pin("1111")), AuthOutcome::Unauthenticated);
    }

    #[test]
    fn test_missing_digests_disable_roles() {
        let auth = RoleAuthenticator::new(None, Some(""));
        assert_eq!(auth.authenticate(&pin("")), AuthOutcome::Unauthenticated);
        assert_eq!(auth.authenticate(&pin("1111")), AuthOutcome::Unauthenticated);
    }

    #[test]
    fn test_is_admin() {
        let auth = authenticator();
        assert!(auth.is_admin(&pin("1111")));
        assert!(!auth.is_admin(&pin("2222")));
    }
}
