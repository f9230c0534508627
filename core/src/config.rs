//! Client construction settings.
//!
//! A `ServiceConfig` is fixed once a client is built; clients expose no
//! setters.

use std::time::Duration;

use crate::error::{ApiError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings shared by both clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Base URL without a trailing slash, e.g. `https://host/findings`.
    pub service_url: String,
    /// Passed through to the transport.
    pub disable_ssl_verification: bool,
    /// Sent on every request, after the standard headers.
    pub default_headers: Vec<(String, String)>,
    /// Upper bound for a single call, authentication excluded.
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(service_url: &str) -> Self {
        Self {
            service_url: service_url.trim_end_matches('/').to_string(),
            disable_ssl_verification: false,
            default_headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_disable_ssl_verification(mut self, disable: bool) -> Self {
        self.disable_ssl_verification = disable;
        self
    }

    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .push((name.to_ascii_lowercase(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load settings from `{NAME}_URL`, `{NAME}_DISABLE_SSL` and
    /// `{NAME}_TIMEOUT_SECS`, falling back to `default_url`.
    pub fn from_env(service_name: &str, default_url: &str) -> Result<Self> {
        Self::from_lookup(service_name, default_url, |key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(service_name: &str, default_url: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let prefix = service_name.to_ascii_uppercase();
        let url = lookup(&format!("{prefix}_URL"))
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| default_url.to_string());
        let mut config = Self::new(url.trim());

        let ssl_key = format!("{prefix}_DISABLE_SSL");
        if let Some(raw) = lookup(&ssl_key) {
            config.disable_ssl_verification = parse_bool(&ssl_key, &raw)?;
        }

        let timeout_key = format!("{prefix}_TIMEOUT_SECS");
        if let Some(raw) = lookup(&timeout_key) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ApiError::Configuration(format!("{timeout_key} must be a whole number of seconds, got `{raw}`"))
            })?;
            if secs == 0 {
                return Err(ApiError::Configuration(format!("{timeout_key} must be greater than zero")));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ApiError::Configuration(format!("{key} must be true or false, got `{raw}`"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = ServiceConfig::new("http://localhost:3000/");
        assert_eq!(config.service_url, "http://localhost:3000");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(!config.disable_ssl_verification);
    }

    #[test]
    fn env_defaults_apply_when_unset() {
        let config = ServiceConfig::from_lookup("FINDINGS_API", "https://example.com/findings", lookup(&[])).unwrap();
        assert_eq!(config.service_url, "https://example.com/findings");
        assert!(!config.disable_ssl_verification);
    }

    #[test]
    fn env_values_override_defaults() {
        let vars = [
            ("FINDINGS_API_URL", "http://127.0.0.1:9000/"),
            ("FINDINGS_API_DISABLE_SSL", "true"),
            ("FINDINGS_API_TIMEOUT_SECS", "5"),
        ];
        let config = ServiceConfig::from_lookup("findings_api", "https://unused", lookup(&vars)).unwrap();
        assert_eq!(config.service_url, "http://127.0.0.1:9000");
        assert!(config.disable_ssl_verification);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_env_values_are_rejected() {
        let vars = [("NOTIFICATIONS_API_DISABLE_SSL", "maybe")];
        let err = ServiceConfig::from_lookup("NOTIFICATIONS_API", "https://x", lookup(&vars)).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));

        let vars = [("NOTIFICATIONS_API_TIMEOUT_SECS", "0")];
        let err = ServiceConfig::from_lookup("NOTIFICATIONS_API", "https://x", lookup(&vars)).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(_)));
    }

    #[test]
    fn default_headers_are_lowercased() {
        let config = ServiceConfig::new("http://h").with_default_header("X-Custom", "1");
        assert_eq!(config.default_headers, vec![("x-custom".to_string(), "1".to_string())]);
    }
}
