/// Caller identity
///
/// Sessions and passwords are handled elsewhere. This service only needs to know
/// who is calling, through the `IdentityProvider` seam.

use crate::config::AuthConfig;
use anyhow::Result;
use axum::http::{HeaderMap, HeaderName};

/// Resolves the authenticated caller of a request
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Current user id, or None when the request is unauthenticated
    fn current_user_id(&self, headers: &HeaderMap) -> Option<String>;
}

/// Reads the caller id from a header set by a trusted upstream gateway
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: HeaderName,
}

impl HeaderIdentity {
    pub fn new(header: HeaderName) -> Self {
        Self { header }
    }

    /// Build from configuration, rejecting header names that are not valid HTTP
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        let header = HeaderName::from_bytes(config.user_header.to_ascii_lowercase().as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid user header '{}': {}", config.user_header, e))?;
        Ok(Self::new(header))
    }
}

impl IdentityProvider for HeaderIdentity {
    fn current_user_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}
