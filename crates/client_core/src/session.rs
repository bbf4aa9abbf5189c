//! Session Accessor: resolves the bearer token persisted on this machine.

use std::{fmt, sync::Arc};

use anyhow::Result;
use storage::KeyValueStore;
use tracing::{info, warn};

/// Storage key the bearer token lives under.
pub const TOKEN_STORAGE_KEY: &str = "jwtToken";

/// Opaque credential attached as `Authorization: Bearer <token>`.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Returns `None` for blank input; a blank stored token means signed out.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<BearerToken>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(token: BearerToken) -> Self {
        Self { token: Some(token) }
    }

    pub fn from_token(token: Option<BearerToken>) -> Self {
        Self { token }
    }

    pub fn token(&self) -> Option<&BearerToken> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

pub struct SessionAccessor {
    store: Arc<dyn KeyValueStore>,
}

impl SessionAccessor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the persisted token. An unreadable store degrades to anonymous.
    pub async fn get_token(&self) -> Option<BearerToken> {
        match self.store.get(TOKEN_STORAGE_KEY).await {
            Ok(raw) => raw.and_then(BearerToken::new),
            Err(err) => {
                warn!(
                    error = %format!("{err:#}"),
                    "session storage unavailable; continuing anonymously"
                );
                None
            }
        }
    }

    pub async fn resolve(&self) -> Session {
        Session::from_token(self.get_token().await)
    }

    pub async fn store_token(&self, token: &BearerToken) -> Result<()> {
        self.store.set(TOKEN_STORAGE_KEY, token.as_str()).await?;
        info!("session token stored");
        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.remove(TOKEN_STORAGE_KEY).await?;
        info!("session token cleared");
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
