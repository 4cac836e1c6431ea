//! HTTP transport layer for the Dropbox API.

use crate::config::DropboxConfig;
use crate::errors::TransportError;
use crate::file::DropboxFile;
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{header::HeaderMap, Client, Method};
use tracing::{debug, warn};
use url::Url;

mod mock;
pub use mock::MockTransport;

/// HTTP transport abstraction for testability.
///
/// Implementations fail with [`TransportError::Http`] for any status of 400
/// or above, carrying the response body text as the detail.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and receive a raw response.
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;
}

/// HTTP request representation.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Bytes>,
    /// When set, the response body is streamed here instead of buffered.
    pub sink: Option<DropboxFile>,
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET method.
    Get,
    /// POST method.
    Post,
    /// PUT method.
    Put,
    /// DELETE method.
    Delete,
}

impl HttpMethod {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Raw status/headers/body triple returned by a transport.
///
/// `body` is empty when the response was streamed into a sink.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a new raw response.
    pub fn new(status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }
}

/// Reqwest-based HTTP transport implementation.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new reqwest transport around an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport with timeouts and user agent taken from config.
    pub fn from_config(config: &DropboxConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Network(format!("Failed to create client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let method: Method = request.method.into();
        debug!(method = %method, url = %request.url, "Sending HTTP request");

        let mut req = self.client.request(method, request.url.clone());
        req = req.headers(request.headers);
        if let Some(body) = request.body {
            req = req.body(body);
        }

        let response = req.send().await?;

        let status = response.status();
        let headers = response.headers().clone();

        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), url = %request.url, "Request failed");
            return Err(TransportError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = match request.sink {
            Some(sink) => {
                let stream = response
                    .bytes_stream()
                    .map(|chunk| chunk.map_err(TransportError::from));
                sink.write_stream(stream).await?;
                Bytes::new()
            }
            None => response.bytes().await?,
        };

        Ok(RawResponse::new(status.as_u16(), headers, body))
    }
}
