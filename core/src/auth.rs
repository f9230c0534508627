//! Authenticator seam.
//!
//! The clients ask the authenticator for an `Authorization` header value once
//! per outbound request and never cache the answer, so implementations are
//! free to refresh tokens between calls.

use std::future::Future;

use crate::error::{ApiError, Result};

/// Source of the `Authorization` header.
pub trait Authenticator: Send + Sync {
    /// Header value for the next request, or `None` to send no header.
    fn authorization_header(&self) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Sends a fixed bearer token.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
}

impl BearerTokenAuthenticator {
    pub fn new(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ApiError::Authentication("bearer token must not be empty".to_string()));
        }
        Ok(Self {
            token: token.to_string(),
        })
    }
}

impl std::fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    async fn authorization_header(&self) -> Result<Option<String>> {
        Ok(Some(format!("Bearer {}", self.token)))
    }
}

/// Sends no `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthAuthenticator;

impl Authenticator for NoAuthAuthenticator {
    async fn authorization_header(&self) -> Result<Option<String>> {
        Ok(None)
    }
}
