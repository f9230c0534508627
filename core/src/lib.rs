//! Async client for the Security Advisor Findings and Notifications APIs.
//!
//! # Overview
//! [`FindingsClient`] covers providers, notes, occurrences and graph queries;
//! [`NotificationsClient`] covers alert channels and the notification signing
//! key. Both are thin, stateless facades over one request pipeline.
//!
//! # Design
//! - Every operation is data: a `const` [`request::Endpoint`] plus the call's
//!   parameters in a [`request::RequestSpec`]. No operation assembles URLs or
//!   bodies by hand.
//! - Building a request is pure and validates required parameters first, so
//!   a `MissingParameter` error never costs an authenticator or network call.
//! - Authentication ([`Authenticator`]) and I/O ([`Transport`]) are injected
//!   seams; [`UreqTransport`] is the default transport.
//! - Every call returns a [`DetailedResponse`] or an [`ApiError`] that keeps
//!   HTTP failures, transport failures and malformed bodies apart.

pub mod auth;
pub mod config;
pub mod error;
pub mod findings;
pub mod http;
pub mod notifications;
pub mod request;
pub mod response;
pub mod service;
pub mod transport;

pub use auth::{Authenticator, BearerTokenAuthenticator, NoAuthAuthenticator};
pub use config::ServiceConfig;
pub use error::{ApiError, ErrorBody, Result};
pub use findings::FindingsClient;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notifications::NotificationsClient;
pub use response::DetailedResponse;
pub use transport::{Transport, UreqTransport};
