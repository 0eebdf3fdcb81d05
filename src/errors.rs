use thiserror::Error;

/// Errors raised when caller input violates a gateway constraint.
///
/// Always recoverable by correcting the input; nothing is retried
/// internally.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("token list must contain at least 1 and at most 1000 tokens, got {0}")]
    TokenCount(usize),

    #[error("notification must contain at least a title")]
    MissingTitle,

    #[error("the following notification keys are not allowed: {0}")]
    DisallowedNotificationKeys(String),

    #[error("invalid value for notification key: {0}")]
    InvalidNotificationValue(String),

    #[error("data map can not be empty")]
    EmptyData,

    #[error("parameter overrides can not be empty")]
    EmptyParameters,

    #[error("no device tokens have been set")]
    MissingTokens,
}

/// Errors raised while loading or validating the client configuration.
///
/// Fatal to the client instance; there is no internal recovery.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("FCM API key is not configured")]
    MissingApiKey,

    #[error("FCM gateway URL is not configured")]
    MissingApiUrl,

    #[error("environment variable {0} is not set")]
    MissingEnvVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidEnvValue { name: &'static str, value: String },
}

/// Network-level failures reported by the transport.
///
/// A non-200 gateway status is not a transport error; `send` reports it
/// as `Ok(false)`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request to FCM gateway failed: {0}")]
    Request(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(String),
}

/// Top-level error type for the crate.
#[derive(Error, Debug)]
pub enum FcmError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
