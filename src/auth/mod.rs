// src/auth/mod.rs
//
// Session resolution seam.
//
// Session issuance lives in an external provider; this crate only resolves
// opaque bearer tokens to user identifiers. Every repository method on
// user-owned data takes the resolved UserId as a mandatory argument, so a
// request that never resolved an identity cannot reach the data layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Identifier of a user as issued by the external auth provider.
/// Opaque to this crate; never parsed, only compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves bearer tokens to users.
pub trait SessionProvider: Send + Sync {
    /// Returns the user a token belongs to, or None for an unknown token.
    fn resolve(&self, token: &str) -> Option<UserId>;
}

/// Token table fed from configuration. Stands in for a real session
/// backend in single-user deployments and in tests.
pub struct StaticSessionProvider {
    tokens: HashMap<String, UserId>,
}

impl StaticSessionProvider {
    pub fn new(tokens: HashMap<String, UserId>) -> Self {
        Self { tokens }
    }
}

impl SessionProvider for StaticSessionProvider {
    fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_provider_resolves_known_token() {
        let mut tokens = HashMap::new();
        tokens.insert("tok-1".to_string(), UserId::from("user-1"));
        let provider = StaticSessionProvider::new(tokens);

        assert_eq!(provider.resolve("tok-1"), Some(UserId::from("user-1")));
        assert_eq!(provider.resolve("tok-2"), None);
    }
}
