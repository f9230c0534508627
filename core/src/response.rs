//! Response normalization.
//!
//! Any 2xx status is success. Non-2xx statuses become [`ApiError::Http`]
//! carrying the parsed error body; a 2xx body that does not match the declared
//! type becomes [`ApiError::MalformedResponse`].

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorBody, Result};
use crate::http::HttpResponse;

/// Result of a successful call: status, headers and the typed body.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedResponse<T> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub result: T,
}

impl<T> DetailedResponse<T> {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DetailedResponse<U> {
        DetailedResponse {
            status: self.status,
            headers: self.headers,
            result: f(self.result),
        }
    }
}

/// Parse a JSON body into `T`.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<DetailedResponse<T>> {
    check_status(&response)?;
    let result = serde_json::from_str(&response.body)
        .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
    Ok(DetailedResponse {
        status: response.status,
        headers: response.headers,
        result,
    })
}

/// Keep the body as raw text.
pub fn parse_text(response: HttpResponse) -> Result<DetailedResponse<String>> {
    check_status(&response)?;
    Ok(DetailedResponse {
        status: response.status,
        headers: response.headers,
        result: response.body,
    })
}

/// Discard the body.
pub fn parse_empty(response: HttpResponse) -> Result<DetailedResponse<()>> {
    check_status(&response)?;
    Ok(DetailedResponse {
        status: response.status,
        headers: response.headers,
        result: (),
    })
}

/// Map non-success status codes to `ApiError::Http`.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: ErrorBody::from_raw(response.body.clone()),
    })
}
