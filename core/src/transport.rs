//! Transport seam and the default `ureq`-backed implementation.

use std::future::Future;

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Non-2xx statuses are responses, not errors: only failures where no
/// response was obtained return `Err`, and those must be `ApiError::Transport`.
pub trait Transport: Send + Sync {
    fn send(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse>> + Send;
}

/// Blocking `ureq` agent driven from tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(config: &ServiceConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .tls_config(
                TlsConfig::builder()
                    .disable_verification(config.disable_ssl_verification)
                    .build(),
            )
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute(&agent, request))
            .await
            .map_err(|e| ApiError::Transport(format!("transport task failed: {e}")))?
    }
}

fn execute(agent: &Agent, req: HttpRequest) -> Result<HttpResponse> {
    let body = req.body.unwrap_or_default();
    let result = match req.method {
        HttpMethod::Get => {
            let mut builder = agent.get(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.call()
        }
        HttpMethod::Delete => {
            let mut builder = agent.delete(&req.url);
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if body.is_empty() {
                builder.call()
            } else {
                builder.force_send_body().send(body.as_bytes())
            }
        }
        HttpMethod::Post | HttpMethod::Put => {
            let mut builder = if req.method == HttpMethod::Post {
                agent.post(&req.url)
            } else {
                agent.put(&req.url)
            };
            for (name, value) in &req.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder.send(body.as_bytes())
        }
    };

    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| ApiError::Transport(format!("reading response body: {e}")))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
