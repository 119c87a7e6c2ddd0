//! Resolution of request credentials to an [`Actor`].
//!
//! Token issuance lives outside this server; all it needs is a way to map an
//! opaque token to the user and role behind it.

use super::permissions::{Actor, UserRole};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Authorizer: Send + Sync {
    /// Returns the actor owning `token`, or `None` for unknown tokens.
    fn resolve(&self, token: &str) -> Option<Actor>;
}

/// A token entry as it appears in the config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub token: String,
    pub user: String,
    pub role: String,
}

/// Authorizer backed by a fixed token table.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenAuthorizer {
    actors: HashMap<String, Actor>,
}

impl StaticTokenAuthorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config entries, skipping entries with an unknown role.
    pub fn from_grants(grants: &[TokenGrant]) -> Self {
        let mut authorizer = Self::new();
        for grant in grants {
            match UserRole::from_str(&grant.role) {
                Some(role) => authorizer.insert(grant.token.clone(), Actor::new(&grant.user, role)),
                None => warn!(
                    "Ignoring token for user {}: unknown role \"{}\"",
                    grant.user, grant.role
                ),
            }
        }
        authorizer
    }

    pub fn insert(&mut self, token: impl Into<String>, actor: Actor) {
        self.actors.insert(token.into(), actor);
    }

    pub fn with_token(mut self, token: impl Into<String>, actor: Actor) -> Self {
        self.insert(token, actor);
        self
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl Authorizer for StaticTokenAuthorizer {
    fn resolve(&self, token: &str) -> Option<Actor> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();
        self.actors.get(token).cloned()
    }
}
