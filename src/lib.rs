//! Legacy FCM push client
//!
//! This library assembles, validates and transmits push notifications to
//! the Firebase Cloud Messaging legacy HTTP gateway.
//!
//! It handles:
//! - Token, notification, data and parameter validation
//! - Merging caller-supplied parameters over configured defaults
//! - Serialization into the gateway's exact wire format
//! - Request submission with server-key authentication
//!
//! Gateway rejections (non-200 statuses) are reported as a boolean, not
//! an error; only network-level failures raise [`FcmError::Transport`].

pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod transport;

pub use client::{FcmClient, MessageBuilder};
pub use config::{FcmConfig, HttpOptions, DEFAULT_API_URL};
pub use errors::{ConfigurationError, FcmError, TransportError, ValidationError};
pub use models::{
    Message, Notification, ParameterOverrides, Parameters, Payload, Priority, Target,
};
pub use transport::{HttpTransport, Transport};
