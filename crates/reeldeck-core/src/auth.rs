//! Credential collaborator seam.
//!
//! Token acquisition and refresh belong to the embedding application; the
//! watch-state subsystem only ever asks "give me a currently valid bearer
//! token". The provider answers one of three ways: a token, "nobody is
//! signed in" (`Ok(None)`), or "the stored credential expired and the
//! refresh failed" (`Err`).

use async_trait::async_trait;

use crate::error::Result;

/// Supplies valid bearer tokens for the tracking service.
///
/// Implementations are expected to refresh an expired credential behind
/// this call; a refresh failure surfaces as the operation's error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a currently valid bearer token, or `None` when no
    /// credential is stored.
    async fn access_token(&self) -> Result<Option<String>>;
}

/// Credential provider backed by a fixed, never-expiring token.
///
/// Useful for tests and for embedders that manage token lifetime
/// elsewhere.
#[derive(Debug, Clone)]
pub struct FixedCredential {
    token: String,
}

impl FixedCredential {
    /// Create a provider that always hands out `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for FixedCredential {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(Some(self.token.clone()))
    }
}

/// Credential provider for the signed-out state. Every operation that
/// needs a token becomes a silent no-op or a "not authenticated" error.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignedOut;

#[async_trait]
impl CredentialProvider for SignedOut {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
