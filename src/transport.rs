use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::debug;

use crate::errors::TransportError;

/// Seam between the client and the HTTP stack.
///
/// The client only needs to POST a body with headers and read back the
/// status code; everything else (TLS, pooling, proxies) belongs to the
/// implementation. Tests substitute their own implementation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: String,
        timeout: Option<Duration>,
    ) -> Result<u16, TransportError>;
}

/// Default [`Transport`] backed by a shared reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        headers: &BTreeMap<String, String>,
        body: String,
        timeout: Option<Duration>,
    ) -> Result<u16, TransportError> {
        let mut header_map = HeaderMap::new();
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            header_map.insert(header_name, header_value);
        }

        let mut request = self.client.post(url).headers(header_map).body(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        debug!(status, "FCM gateway responded");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn invalid_header_value_is_rejected_before_sending() {
        let transport = HttpTransport::new();
        let mut headers = BTreeMap::new();
        headers.insert("Authorization".to_string(), "key=\nbroken".to_string());

        let err = transport
            .post("http://localhost:0/fcm/send", &headers, String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidHeader(name) if name == "Authorization"));
    }
}
