//! Shared call path for both clients.
//!
//! # Design
//! `BaseService` holds the immutable configuration, authenticator and
//! transport. A call goes through three steps:
//! 1. `RequestSpec::build` validates parameters and lays out the request
//!    (pure, no I/O).
//! 2. The authenticator supplies the `Authorization` header.
//! 3. The transport executes the request, bounded by the configured timeout.
//!
//! Nothing is retried and nothing is retained between calls.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::Authenticator;
use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use crate::http::HttpResponse;
use crate::request::RequestSpec;
use crate::response::{self, DetailedResponse};
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct BaseService<A, T> {
    config: ServiceConfig,
    authenticator: A,
    transport: T,
}

impl<A: Authenticator, T: Transport> BaseService<A, T> {
    pub fn new(config: ServiceConfig, authenticator: A, transport: T) -> Self {
        Self {
            config,
            authenticator,
            transport,
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Build, authenticate and send; returns the raw response.
    pub async fn send(&self, spec: RequestSpec) -> Result<HttpResponse> {
        let operation = spec.endpoint().operation;
        let mut request = spec.build(&self.config)?;
        if let Some(value) = self.authenticator.authorization_header().await? {
            request.headers.push(("authorization".to_string(), value));
        }

        debug!(operation, method = %request.method, url = %request.url, "sending request");
        let response = match tokio::time::timeout(self.config.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(operation, error = %err, "transport failure");
                return Err(err);
            }
            Err(_) => {
                warn!(operation, timeout = ?self.config.timeout, "request timed out");
                return Err(ApiError::Transport(format!(
                    "request timed out after {:?}",
                    self.config.timeout
                )));
            }
        };

        if response.is_success() {
            debug!(operation, status = response.status, "received response");
        } else {
            warn!(operation, status = response.status, "service returned an error status");
        }
        Ok(response)
    }

    pub async fn send_json<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<DetailedResponse<R>> {
        response::parse_json(self.send(spec).await?)
    }

    pub async fn send_text(&self, spec: RequestSpec) -> Result<DetailedResponse<String>> {
        response::parse_text(self.send(spec).await?)
    }

    pub async fn send_empty(&self, spec: RequestSpec) -> Result<DetailedResponse<()>> {
        response::parse_empty(self.send(spec).await?)
    }
}
