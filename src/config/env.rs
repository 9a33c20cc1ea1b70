use crate::utils::error::{BatchError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_range, validate_required_field, validate_url, Validate,
};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Credentials and endpoint of the remote service, built once at startup.
#[derive(Clone)]
pub struct ClientConfig {
    /// OAuth application id and secret. Requests only need the access token;
    /// these are kept so a `.env` written for app registration loads unchanged.
    pub client_key: Option<String>,
    pub client_secret: Option<String>,
    pub access_token: String,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl ClientConfig {
    /// Reads `CLIENT_KEY`, `CLIENT_SECRET`, `ACCESS_TOKEN`, `API_BASE_URL` and
    /// `REQUEST_TIMEOUT`, loading a `.env` file first when one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => {
                return Err(BatchError::ConfigError {
                    message: format!("failed to load .env file: {}", e),
                })
            }
        }

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let access_token = get("ACCESS_TOKEN");
        let access_token = validate_required_field("ACCESS_TOKEN", &access_token)?.clone();
        let api_base_url = get("API_BASE_URL");
        let api_base_url = validate_required_field("API_BASE_URL", &api_base_url)?
            .trim_end_matches('/')
            .to_string();

        let request_timeout = match get("REQUEST_TIMEOUT") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                BatchError::InvalidConfigValueError {
                    field: "REQUEST_TIMEOUT".to_string(),
                    value: raw.clone(),
                    reason: format!("expected whole seconds: {}", e),
                }
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        let config = Self {
            client_key: get("CLIENT_KEY"),
            client_secret: get("CLIENT_SECRET"),
            access_token,
            api_base_url,
            request_timeout: Duration::from_secs(request_timeout),
        };
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("ACCESS_TOKEN", &self.access_token)?;
        validate_url("API_BASE_URL", &self.api_base_url)?;
        validate_range(
            "REQUEST_TIMEOUT",
            self.request_timeout.as_secs(),
            1,
            MAX_REQUEST_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_key", &self.client_key)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("access_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_defaults_timeout() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ACCESS_TOKEN", "tok"),
            ("API_BASE_URL", "https://infosec.exchange/"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://infosec.exchange");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.client_key.is_none());
    }

    #[test]
    fn test_from_lookup_reads_all_fields() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("CLIENT_KEY", "key"),
            ("CLIENT_SECRET", "secret"),
            ("ACCESS_TOKEN", "tok"),
            ("API_BASE_URL", "https://mastodon.social"),
            ("REQUEST_TIMEOUT", "10"),
        ]))
        .unwrap();

        assert_eq!(config.client_key.as_deref(), Some("key"));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("API_BASE_URL", "https://mastodon.social")]))
            .unwrap_err();
        assert!(matches!(err, BatchError::MissingConfigError { ref field } if field == "ACCESS_TOKEN"));
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[
            ("ACCESS_TOKEN", "tok"),
            ("API_BASE_URL", "https://mastodon.social"),
            ("REQUEST_TIMEOUT", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, BatchError::InvalidConfigValueError { .. }));

        assert!(ClientConfig::from_lookup(lookup(&[
            ("ACCESS_TOKEN", "tok"),
            ("API_BASE_URL", "https://mastodon.social"),
            ("REQUEST_TIMEOUT", "0"),
        ]))
        .is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("ACCESS_TOKEN", "super-secret-token"),
            ("API_BASE_URL", "https://mastodon.social"),
        ]))
        .unwrap();
        assert!(!format!("{:?}", config).contains("super-secret-token"));
    }
}
