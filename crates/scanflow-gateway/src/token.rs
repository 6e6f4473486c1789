//! Bearer-token provisioning.
//!
//! Token storage and refresh live outside this crate; the gateway only asks
//! for a currently valid access token right before each request.

use async_trait::async_trait;
use scanflow_core::error::{Result, ScanError};

/// Supplies the bearer token attached to every authenticated request.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid access token.
    async fn access_token(&self) -> Result<String>;
}

/// A fixed-token provider for tests and short-lived tooling.
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(ScanError::transport("no access token available"));
        }
        Ok(self.token.clone())
    }
}
