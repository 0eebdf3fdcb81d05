use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::FcmConfig;
use crate::errors::{FcmError, TransportError, ValidationError};
use crate::models::{
    coerce_to_string, Message, Notification, ParameterOverrides, Parameters, Payload, Target,
    DEFAULT_ICON, MAX_TOKENS,
};
use crate::transport::{HttpTransport, Transport};

const STATUS_OK: u16 = 200;

/// Client for the legacy FCM HTTP gateway.
///
/// Holds the validated configuration and the transport; one client can
/// serve any number of sequential sends. Build one [`MessageBuilder`]
/// per logical message via [`FcmClient::message`].
pub struct FcmClient {
    config: FcmConfig,
    transport: Arc<dyn Transport>,
}

impl FcmClient {
    /// Create a client over the default reqwest transport.
    ///
    /// Fails with [`FcmError::Configuration`] if the API key or gateway
    /// URL is missing.
    pub fn new(config: FcmConfig) -> Result<Self, FcmError> {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client with an injected transport implementation.
    pub fn with_transport(
        config: FcmConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, FcmError> {
        config.validate()?;
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &FcmConfig {
        &self.config
    }

    /// New message builder seeded with the configured default parameters.
    pub fn message(&self) -> MessageBuilder {
        MessageBuilder::new(self.config.parameters.clone())
    }

    /// Build the message and submit it to the gateway.
    ///
    /// Returns `Ok(true)` when the gateway answered 200, `Ok(false)` for
    /// any other status (the gateway reports per-token errors in the
    /// response body, which this client does not consume). Network-level
    /// failures surface as [`FcmError::Transport`].
    pub async fn send(&self, message: &MessageBuilder) -> Result<bool, FcmError> {
        let message = message.build()?;
        let body = serde_json::to_string(&message)
            .map_err(|e| TransportError::Request(format!("failed to encode message body: {e}")))?;
        let headers = self.http_headers();

        let recipients = match &message.target {
            Target::To(_) => 1,
            Target::RegistrationIds(tokens) => tokens.len(),
        };
        debug!(recipients, "sending push message to FCM gateway");

        let status = self
            .transport
            .post(&self.config.api_url, &headers, body, self.config.http.timeout)
            .await?;

        if status == STATUS_OK {
            debug!(status, "FCM gateway accepted the message");
        } else {
            warn!(status, "FCM gateway rejected the message");
        }
        Ok(status == STATUS_OK)
    }

    /// Configured per-request headers overlaid with the fixed gateway
    /// headers; the overlay wins on collision.
    fn http_headers(&self) -> BTreeMap<String, String> {
        let mut headers = self.config.http.headers.clone();
        headers.insert(
            "Authorization".to_string(),
            format!("key={}", self.config.api_key),
        );
        headers.insert(
            "Content-Type".to_string(),
            "application/json".to_string(),
        );
        headers
    }
}

// The transport is a trait object and the api key is a credential, so
// render only the gateway endpoint.
impl fmt::Debug for FcmClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcmClient")
            .field("api_url", &self.config.api_url)
            .finish_non_exhaustive()
    }
}

/// Incrementally assembles one push message.
///
/// Setters validate eagerly and replace the previous value wholesale.
/// A builder is intended for a single logical send; it is not shared
/// across tasks.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    defaults: Parameters,
    tokens: Vec<String>,
    notification: Option<Notification>,
    data: Option<BTreeMap<String, String>>,
    parameters: Option<Parameters>,
}

impl MessageBuilder {
    /// Builder using `defaults` as the base for parameter merges.
    pub fn new(defaults: Parameters) -> Self {
        Self {
            defaults,
            tokens: Vec::new(),
            notification: None,
            data: None,
            parameters: None,
        }
    }

    /// Replace the target tokens. Between 1 and 1000 tokens are accepted.
    pub fn set_tokens(&mut self, tokens: Vec<String>) -> Result<&mut Self, ValidationError> {
        if tokens.is_empty() || tokens.len() > MAX_TOKENS {
            return Err(ValidationError::TokenCount(tokens.len()));
        }
        self.tokens = tokens;
        Ok(self)
    }

    /// Set the notification, injecting the default icon when none is set.
    pub fn set_notification(&mut self, mut notification: Notification) -> &mut Self {
        if notification.icon.is_none() {
            notification.icon = Some(DEFAULT_ICON.to_string());
        }
        self.notification = Some(notification);
        self
    }

    /// Set the notification from an untyped JSON map; enforces the key
    /// allow-list and the mandatory title.
    pub fn set_notification_map(
        &mut self,
        map: &Map<String, Value>,
    ) -> Result<&mut Self, ValidationError> {
        let notification = Notification::from_map(map)?;
        Ok(self.set_notification(notification))
    }

    /// Set the custom data payload; every value is coerced to a string.
    pub fn set_data(&mut self, data: &Map<String, Value>) -> Result<&mut Self, ValidationError> {
        if data.is_empty() {
            return Err(ValidationError::EmptyData);
        }
        self.data = Some(
            data.iter()
                .map(|(key, value)| (key.clone(), coerce_to_string(value)))
                .collect(),
        );
        Ok(self)
    }

    /// Merge `overrides` over the configured defaults and store the
    /// result. Each call merges from the defaults again, never from a
    /// previous call's result.
    pub fn set_parameters(
        &mut self,
        overrides: &ParameterOverrides,
    ) -> Result<&mut Self, ValidationError> {
        if overrides.is_empty() {
            return Err(ValidationError::EmptyParameters);
        }
        self.parameters = Some(overrides.merge_over(&self.defaults));
        Ok(self)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn data(&self) -> Option<&BTreeMap<String, String>> {
        self.data.as_ref()
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.parameters.as_ref()
    }

    /// Present payload branches; empty when neither notification nor
    /// data has been set.
    pub fn payload(&self) -> Payload {
        Payload {
            notification: self.notification.clone(),
            data: self.data.clone(),
        }
    }

    /// Assemble the wire message. Fails if no tokens were ever set.
    pub fn build(&self) -> Result<Message, ValidationError> {
        let target = match self.tokens.as_slice() {
            [] => return Err(ValidationError::MissingTokens),
            [single] => Target::To(single.clone()),
            many => Target::RegistrationIds(many.to_vec()),
        };
        Ok(Message {
            target,
            payload: self.payload(),
            parameters: self.parameters.clone(),
        })
    }
}
