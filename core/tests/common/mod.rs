//! Test doubles for the authenticator and transport seams.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use advisor_client::{
    ApiError, Authenticator, FindingsClient, HttpRequest, HttpResponse, NotificationsClient, Result, ServiceConfig,
    Transport,
};

pub const BASE_URL: &str = "http://localhost:3000";
pub const ACCOUNT: &str = "acc";

/// Records every request and replays queued outcomes in order.
///
/// With nothing queued it answers `200 {}`. A configured delay is slept
/// before every answer.
#[derive(Clone, Default)]
pub struct StubTransport {
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    outcomes: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.outcomes.lock().unwrap().push_back(Ok(HttpResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(ApiError::Transport(message.to_string())));
        self
    }

    pub fn delay(&self, delay: Duration) -> &Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

impl Transport for StubTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let outcome = self.outcomes.lock().unwrap().pop_front();
        outcome.unwrap_or_else(|| {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "{}".to_string(),
            })
        })
    }
}

/// Counts calls and hands out a fresh token each time.
#[derive(Clone, Default)]
pub struct CountingAuthenticator {
    calls: Arc<AtomicUsize>,
}

impl CountingAuthenticator {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Authenticator for CountingAuthenticator {
    async fn authorization_header(&self) -> Result<Option<String>> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Some(format!("Bearer token-{n}")))
    }
}

/// Always fails to produce a credential.
#[derive(Clone, Default)]
pub struct FailingAuthenticator;

impl Authenticator for FailingAuthenticator {
    async fn authorization_header(&self) -> Result<Option<String>> {
        Err(ApiError::Authentication("token endpoint unreachable".to_string()))
    }
}

pub fn findings(transport: &StubTransport) -> (FindingsClient<CountingAuthenticator, StubTransport>, CountingAuthenticator) {
    let auth = CountingAuthenticator::default();
    let client = FindingsClient::with_transport(ServiceConfig::new(BASE_URL), auth.clone(), transport.clone());
    (client, auth)
}

pub fn notifications(
    transport: &StubTransport,
) -> (NotificationsClient<CountingAuthenticator, StubTransport>, CountingAuthenticator) {
    let auth = CountingAuthenticator::default();
    let client = NotificationsClient::with_transport(ServiceConfig::new(BASE_URL), auth.clone(), transport.clone());
    (client, auth)
}
