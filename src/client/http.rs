//! HTTP Client
//!
//! Thin async transport over `reqwest`: bearer auth, JSON bodies and status
//! mapping. No retries.

use crate::config::ClientConfig;
use crate::error::{GrokError, Result};
use bytes::Bytes;
use futures::Stream;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::pin::Pin;

/// Raw response body delivered incrementally
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// HTTP client bound to one API root and key
#[derive(Debug, Clone)]
pub struct HttpClient {
    /// Inner reqwest client
    client: Client,

    /// API root, without trailing slash
    base_url: String,

    /// `Authorization` header value
    auth: HeaderValue,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let api_key = config.resolve_api_key()?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| GrokError::Config(format!("Invalid API key format: {}", e)))?;
        auth.set_sensitive(true);

        let client = client_builder(config)
            .build()
            .map_err(|e| GrokError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.resolve_base_url().trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Sets a custom reqwest client; its timeouts replace the configured ones.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Absolute URL for an endpoint path
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// GET an endpoint and decode its JSON body
    pub async fn get_json<R>(&self, endpoint: &str) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        tracing::debug!(method = "GET", url = %url, "sending request");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, self.auth.clone())
            .send()
            .await?;
        decode_body(ensure_success(response).await?).await
    }

    /// POST a JSON body and decode the JSON reply
    pub async fn post_json<T, R>(&self, endpoint: &str, body: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let url = self.url(endpoint);
        let payload = serde_json::to_vec(body).map_err(GrokError::Encoding)?;
        tracing::debug!(method = "POST", url = %url, bytes = payload.len(), "sending request");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await?;
        decode_body(ensure_success(response).await?).await
    }

    /// POST a JSON body and return the reply body as a byte stream
    pub async fn post_stream<T>(&self, endpoint: &str, body: &T) -> Result<ByteStream>
    where
        T: Serialize,
    {
        use async_stream::stream;
        use futures::StreamExt;

        let url = self.url(endpoint);
        let payload = serde_json::to_vec(body).map_err(GrokError::Encoding)?;
        tracing::debug!(method = "POST", url = %url, bytes = payload.len(), "opening stream");

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, self.auth.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(payload)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let mut byte_stream = response.bytes_stream();
        let s = stream! {
            while let Some(chunk) = byte_stream.next().await {
                yield chunk.map_err(GrokError::from);
            }
        };

        Ok(Box::pin(s))
    }
}

/// reqwest builder carrying the configured deadlines
pub(crate) fn client_builder(config: &ClientConfig) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(config.timeout())
        .connect_timeout(config.connect_timeout())
}

/// Turn a non-2xx response into `GrokError::Http`
async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = error_body(status.as_u16(), response.text().await);
    tracing::warn!(status = status.as_u16(), body = %body, "request failed");
    Err(GrokError::Http {
        status: status.as_u16(),
        body,
    })
}

/// Body of a failed response; an unreadable body becomes empty
fn error_body(status: u16, body: reqwest::Result<String>) -> String {
    body.unwrap_or_else(|e| {
        tracing::debug!(status, error = %e, "failed to read error body");
        String::new()
    })
}

async fn decode_body<R>(response: Response) -> Result<R>
where
    R: DeserializeOwned,
{
    let body = response.bytes().await?;
    if body.is_empty() {
        return Err(GrokError::NoData);
    }

    tracing::trace!(body = %String::from_utf8_lossy(&body), "raw response");
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(&ClientConfig::new("test-key"));
        assert!(client.is_ok());
    }

    #[test]
    fn test_url_joining() {
        let config = ClientConfig::new("test-key").with_base_url("http://localhost:8080/v1/");
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.url("models"), "http://localhost:8080/v1/models");
        assert_eq!(
            client.url("/chat/completions"),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_zero_timeout_fails_construction() {
        let config = ClientConfig::new("test-key").with_timeout(std::time::Duration::ZERO);
        let err = HttpClient::new(&config).unwrap_err();
        assert!(matches!(err, GrokError::Config(_)));
    }

    #[tokio::test]
    async fn test_unreadable_error_body_becomes_empty() {
        let read_failure = Client::builder()
            .no_proxy()
            .build()
            .unwrap()
            .get("http://127.0.0.1:1/")
            .send()
            .await
            .unwrap_err();

        assert_eq!(error_body(502, Err(read_failure)), "");
        assert_eq!(error_body(502, Ok("bad gateway".to_string())), "bad gateway");
    }

    #[test]
    fn test_invalid_key_is_config_error() {
        let err = HttpClient::new(&ClientConfig::new("bad\nkey")).unwrap_err();
        assert!(matches!(err, GrokError::Config(_)));
    }
}
