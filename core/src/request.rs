//! Declarative request construction.
//!
//! # Design
//! Every operation is a `const` [`Endpoint`] (method + path template) plus a
//! [`RequestSpec`] filled with the call's parameters. `RequestSpec::build` is
//! the only place that turns those into an [`HttpRequest`]: it substitutes and
//! percent-encodes path parameters, encodes the query string, serializes the
//! body and lays out the standard headers. Building is pure; validation
//! failures surface before any authenticator or transport call.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use crate::config::ServiceConfig;
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest};

/// RFC 3986 unreserved characters stay as-is; everything else is encoded.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const JSON: &str = "application/json";
const USER_AGENT: &str = concat!("advisor-client-rust/", env!("CARGO_PKG_VERSION"));

/// Static description of one REST operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Operation name used in logs.
    pub operation: &'static str,
    pub method: HttpMethod,
    /// Path relative to the service URL with `{name}` placeholders.
    pub path: &'static str,
}

impl Endpoint {
    pub const fn new(operation: &'static str, method: HttpMethod, path: &'static str) -> Self {
        Self {
            operation,
            method,
            path,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Body {
    Json(String),
    Text { content_type: String, text: String },
}

/// Parameters of a single call against an [`Endpoint`].
#[derive(Debug, Clone)]
pub struct RequestSpec {
    endpoint: Endpoint,
    path_params: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl RequestSpec {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Value for a `{name}` placeholder. Empty values count as missing.
    pub fn path(mut self, name: &'static str, value: &str) -> Self {
        self.path_params.push((name, value.to_string()));
        self
    }

    /// Query parameter; `None` is omitted from the URL.
    pub fn query<V: ToString>(mut self, name: &'static str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.query.push((name, value.to_string()));
        }
        self
    }

    /// Per-call header; `None` is omitted. Overrides a default header of the
    /// same name.
    pub fn header<V: ToString>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.headers.push((name.to_ascii_lowercase(), value.to_string()));
        }
        self
    }

    pub fn json_body<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let json = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(Body::Json(json));
        Ok(self)
    }

    /// Body sent verbatim with the given content type.
    pub fn text_body(mut self, content_type: &str, text: &str) -> Self {
        self.body = Some(Body::Text {
            content_type: content_type.to_string(),
            text: text.to_string(),
        });
        self
    }

    /// Produce the outbound request, without the authorization header.
    pub fn build(&self, config: &ServiceConfig) -> Result<HttpRequest> {
        let path = expand_path(self.endpoint.path, &self.path_params)?;
        let mut url = format!("{}{}", config.service_url, path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&self.query));
        }

        let mut headers = vec![("accept".to_string(), JSON.to_string())];
        let body = match &self.body {
            Some(Body::Json(json)) => {
                headers.push(("content-type".to_string(), JSON.to_string()));
                Some(json.clone())
            }
            Some(Body::Text { content_type, text }) => {
                headers.push(("content-type".to_string(), content_type.clone()));
                Some(text.clone())
            }
            None => None,
        };
        headers.push(("user-agent".to_string(), USER_AGENT.to_string()));
        headers.extend(
            config
                .default_headers
                .iter()
                .filter(|(name, _)| !self.headers.iter().any(|(own, _)| own.eq_ignore_ascii_case(name)))
                .cloned(),
        );
        headers.extend(self.headers.iter().cloned());

        Ok(HttpRequest {
            method: self.endpoint.method,
            url,
            headers,
            body,
        })
    }
}

/// Fail with `MissingParameter` when a required field is empty.
pub fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingParameter(name));
    }
    Ok(())
}

/// Fail with `MissingParameter` when a required list is empty.
pub fn require_list<T>(name: &'static str, values: &[T]) -> Result<()> {
    if values.is_empty() {
        return Err(ApiError::MissingParameter(name));
    }
    Ok(())
}

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

fn expand_path(template: &'static str, params: &[(&'static str, String)]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 32);
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| ApiError::InvalidParameter {
            name: "path",
            reason: format!("unterminated placeholder in `{template}`"),
        })?;
        let name = &after[..close];
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
            .filter(|value| !value.trim().is_empty())
            .ok_or(ApiError::MissingParameter(name))?;
        out.push_str(&encode_component(value));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn encode_query(query: &[(&'static str, String)]) -> String {
    query
        .iter()
        .map(|(name, value)| format!("{}={}", encode_component(name), encode_component(value)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use percent_encoding::percent_decode_str;

    use super::*;

    const GET_NOTE: Endpoint = Endpoint::new(
        "get_note",
        HttpMethod::Get,
        "/v1/{account_id}/providers/{provider_id}/notes/{note_id}",
    );

    fn config() -> ServiceConfig {
        ServiceConfig::new("http://localhost:3000")
    }

    #[test]
    fn placeholders_are_substituted() {
        let req = RequestSpec::new(GET_NOTE)
            .path("account_id", "acc")
            .path("provider_id", "prov")
            .path("note_id", "n1")
            .build(&config())
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/v1/acc/providers/prov/notes/n1");
        assert!(req.body.is_none());
        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header("content-type"), None);
    }

    #[test]
    fn missing_or_empty_placeholder_is_rejected() {
        let err = RequestSpec::new(GET_NOTE)
            .path("account_id", "acc")
            .path("note_id", "n1")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter("provider_id")));

        let err = RequestSpec::new(GET_NOTE)
            .path("account_id", "")
            .path("provider_id", "p")
            .path("note_id", "n1")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter("account_id")));

        let err = RequestSpec::new(GET_NOTE)
            .path("account_id", "acc")
            .path("provider_id", "  ")
            .path("note_id", "n1")
            .build(&config())
            .unwrap_err();
        assert!(matches!(err, ApiError::MissingParameter("provider_id")));
    }

    #[test]
    fn reserved_characters_in_path_round_trip() {
        for original in ["a/b", "what?now", "50% off", "x#y&z=1", "sp ace", "ünï"] {
            let req = RequestSpec::new(GET_NOTE)
                .path("account_id", "acc")
                .path("provider_id", "prov")
                .path("note_id", original)
                .build(&config())
                .unwrap();
            let segment = req.url.rsplit('/').next().unwrap();
            assert!(!segment.contains(['/', '?', '#', ' ']), "{original}: {segment}");
            let decoded = percent_decode_str(segment).decode_utf8().unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn absent_query_values_are_omitted() {
        let endpoint = Endpoint::new("list", HttpMethod::Get, "/v1/{account_id}/providers");
        let req = RequestSpec::new(endpoint)
            .path("account_id", "acc")
            .query("limit", Some(2))
            .query::<u32>("skip", None)
            .query("start_provider_id", Some("a b&c"))
            .build(&config())
            .unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/v1/acc/providers?limit=2&start_provider_id=a%20b%26c"
        );

        let req = RequestSpec::new(endpoint)
            .path("account_id", "acc")
            .query::<&str>("page_token", None)
            .build(&config())
            .unwrap();
        assert!(!req.url.contains('?'));
    }

    #[test]
    fn text_body_is_sent_verbatim() {
        let endpoint = Endpoint::new("post_graph", HttpMethod::Post, "/v1/{account_id}/graph");
        let req = RequestSpec::new(endpoint)
            .path("account_id", "acc")
            .text_body("application/graphql", "{notes{id}}")
            .build(&config())
            .unwrap();
        assert_eq!(req.body.as_deref(), Some("{notes{id}}"));
        assert_eq!(req.header("content-type"), Some("application/graphql"));
    }

    #[test]
    fn per_call_headers_override_defaults() {
        let config = config()
            .with_default_header("Transaction-Id", "default")
            .with_default_header("X-Team", "sec");
        let req = RequestSpec::new(GET_NOTE)
            .path("account_id", "acc")
            .path("provider_id", "p")
            .path("note_id", "n")
            .header("Transaction-Id", Some("call-1"))
            .build(&config)
            .unwrap();
        let ids: Vec<_> = req
            .headers
            .iter()
            .filter(|(k, _)| k == "transaction-id")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(ids, vec!["call-1"]);
        assert_eq!(req.header("x-team"), Some("sec"));
        assert!(req.header("user-agent").unwrap().starts_with("advisor-client-rust/"));
    }

    #[test]
    fn required_field_checks() {
        assert!(require("name", "channel").is_ok());
        assert!(matches!(require("name", "  "), Err(ApiError::MissingParameter("name"))));
        assert!(matches!(
            require_list::<String>("body", &[]),
            Err(ApiError::MissingParameter("body"))
        ));
    }
}
