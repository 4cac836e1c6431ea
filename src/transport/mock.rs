//! Recording transport for tests.

use super::{HttpRequest, HttpTransport, RawResponse};
use crate::errors::TransportError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Mock HTTP transport that replays queued responses in order.
///
/// Mirrors the real transport's contract: statuses of 400 and above become
/// [`TransportError::Http`], and a request carrying a sink gets the queued
/// body written into the sink instead of returned.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    request_history: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: RawResponse) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
        self
    }

    /// Queue a JSON response.
    pub fn queue_json_response(&self, status: u16, body: &serde_json::Value) -> &Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.queue_response(RawResponse::new(
            status,
            headers,
            Bytes::from(body.to_string()),
        ))
    }

    /// Queue a response with an arbitrary content type.
    pub fn queue_body(&self, status: u16, content_type: &'static str, body: impl Into<Bytes>) -> &Self {
        let mut headers = HeaderMap::new();
        if !content_type.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        self.queue_response(RawResponse::new(status, headers, body.into()))
    }

    /// Get request history.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.request_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Get last request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.request_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let sink = request.sink.clone();
        self.request_history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let response = self
            .responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| TransportError::Network("No mock response available".to_string()))?;

        if response.status >= 400 {
            return Err(TransportError::Http {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            });
        }

        match sink {
            Some(sink) => {
                let chunk = futures::stream::iter(vec![Ok(response.body)]);
                sink.write_stream(chunk).await?;
                Ok(RawResponse::new(response.status, response.headers, Bytes::new()))
            }
            None => Ok(response),
        }
    }
}
