use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use crate::errors::ConfigurationError;
use crate::models::Parameters;

/// Production endpoint of the legacy FCM HTTP gateway.
pub const DEFAULT_API_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Transport-level options applied to every request.
///
/// Headers set here are merged under the client's fixed `Authorization`
/// and `Content-Type` headers, which always win on collision.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub timeout: Option<Duration>,
    pub headers: BTreeMap<String, String>,
}

/// Client configuration: gateway credentials, default delivery
/// parameters and default HTTP options.
///
/// Passed to [`crate::FcmClient::new`]; read-only afterwards.
#[derive(Debug, Clone)]
pub struct FcmConfig {
    pub api_key: String,
    pub api_url: String,
    pub parameters: Parameters,
    pub http: HttpOptions,
}

impl FcmConfig {
    /// Configuration for the production gateway with default parameters.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: DEFAULT_API_URL.to_string(),
            parameters: Parameters::default(),
            http: HttpOptions::default(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_http(mut self, http: HttpOptions) -> Self {
        self.http = http;
        self
    }

    /// Load configuration from the environment.
    ///
    /// Reads `FCM_API_KEY` (required), `FCM_API_URL` (optional endpoint
    /// override) and `FCM_TIMEOUT_SECS` (optional request timeout).
    pub fn from_env() -> Result<Self, ConfigurationError> {
        dotenv().ok();

        let api_key =
            env::var("FCM_API_KEY").map_err(|_| ConfigurationError::MissingEnvVar("FCM_API_KEY"))?;
        if api_key.trim().is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }

        let mut config = Self::new(api_key);
        if let Ok(url) = env::var("FCM_API_URL") {
            config.api_url = url;
        }
        if let Ok(raw) = env::var("FCM_TIMEOUT_SECS") {
            let secs: u64 = raw.parse().map_err(|_| ConfigurationError::InvalidEnvValue {
                name: "FCM_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.http.timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigurationError::MissingApiKey);
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigurationError::MissingApiUrl);
        }
        Ok(())
    }
}
