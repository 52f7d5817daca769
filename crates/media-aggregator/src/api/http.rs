//! Bounded-timeout HTTP transport shared by the provider clients.
//!
//! Every call is issued exactly once. Failures are classified into
//! [`UpstreamStatus`] values; retrying is left to whoever calls the gateway.

use crate::error::{UpstreamError, UpstreamStatus};
use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("media-aggregator/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in an [`UpstreamError`]
const ERROR_BODY_LIMIT: usize = 200;

/// HTTP client bound to one provider
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    provider: &'static str,
}

impl HttpTransport {
    /// Create a transport whose every request times out after `timeout`
    pub fn new(provider: &'static str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .with_context(|| format!("Failed to create HTTP client for {}", provider))?;

        Ok(Self { client, provider })
    }

    /// GET `url` with URL-encoded query parameters and decode a JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, UpstreamError> {
        let response = self.send(url, self.client.get(url).query(query)).await?;
        self.decode(url, response).await
    }

    /// POST a JSON body to `url` and decode a JSON response
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, UpstreamError> {
        let request = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body);
        let response = self.send(url, request).await?;
        self.decode(url, response).await
    }

    /// GET `url` and return the raw body
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, UpstreamError> {
        let response = self.send(url, self.client.get(url)).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(url, e))?;
        Ok(body.to_vec())
    }

    async fn send(&self, url: &str, request: RequestBuilder) -> Result<Response, UpstreamError> {
        debug!(provider = self.provider, url = %url, "Making API request");

        let response = request.send().await.map_err(|e| self.classify(url, e))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message: String = error_text.chars().take(ERROR_BODY_LIMIT).collect();

        warn!(
            provider = self.provider,
            url = %url,
            status = %status,
            error = %message,
            "Request failed"
        );

        Err(UpstreamError::new(
            self.provider,
            UpstreamStatus::Http(status.as_u16()),
            message,
        ))
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> Result<T, UpstreamError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| self.classify(url, e))?;

        serde_json::from_slice(&body).map_err(|e| {
            warn!(provider = self.provider, url = %url, error = %e, "Failed to parse response");
            UpstreamError::malformed(self.provider, format!("Failed to parse response: {}", e))
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> UpstreamError {
        let status = if err.is_timeout() {
            UpstreamStatus::Timeout
        } else if err.is_decode() {
            UpstreamStatus::Malformed
        } else {
            UpstreamStatus::Network
        };

        warn!(provider = self.provider, url = %url, status = %status, error = %err, "Request error");
        UpstreamError::new(self.provider, status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_creation() {
        let transport = HttpTransport::new("jikan", Duration::from_secs(12));
        assert!(transport.is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_failure() {
        let transport = HttpTransport::new("test", Duration::from_secs(2)).unwrap();
        let err = transport
            .get_bytes("http://127.0.0.1:9/unreachable")
            .await
            .unwrap_err();
        assert!(matches!(
            err.status,
            UpstreamStatus::Network | UpstreamStatus::Timeout
        ));
        assert_eq!(err.provider, "test");
    }

    #[tokio::test]
    async fn test_silent_server_is_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport = HttpTransport::new("test", Duration::from_millis(100)).unwrap();
        let err = transport
            .get_bytes(&format!("http://{}/silent", addr))
            .await
            .unwrap_err();

        assert_eq!(err.status, UpstreamStatus::Timeout);
        server.abort();
    }
}
