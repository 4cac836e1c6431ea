//! Request pipeline: URL resolution, body shaping, header assembly and dispatch.

use crate::config::{expose, DropboxConfig};
use crate::errors::{DropboxError, DropboxResult, RequestError};
use crate::file::DropboxFile;
use crate::request::{DropboxRequest, EndpointType};
use crate::response::DropboxResponse;
use crate::transport::{HttpRequest, HttpTransport};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Header carrying the parameters of a content endpoint call.
pub const API_ARG_HEADER: &str = "dropbox-api-arg";

/// Content type of an uploaded file body.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Sends [`DropboxRequest`]s through an [`HttpTransport`].
///
/// Each call performs exactly one HTTP exchange.
#[derive(Clone)]
pub struct DropboxClient {
    transport: Arc<dyn HttpTransport>,
    config: DropboxConfig,
}

impl DropboxClient {
    /// Creates a client over the given transport.
    pub fn new(transport: Arc<dyn HttpTransport>, config: DropboxConfig) -> Self {
        Self { transport, config }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Client configuration.
    pub fn config(&self) -> &DropboxConfig {
        &self.config
    }

    /// Resolves an endpoint against the API or content root.
    ///
    /// The endpoint is appended to the root verbatim, so `/files/upload`
    /// under `https://content.dropboxapi.com/2` keeps the `/2` prefix.
    pub fn build_url(&self, endpoint: &str, endpoint_type: EndpointType) -> DropboxResult<Url> {
        let base = match endpoint_type {
            EndpointType::Api => &self.config.api_url,
            EndpointType::Content => &self.config.content_url,
        };
        let raw = format!("{}{}", base.as_str().trim_end_matches('/'), endpoint);
        Url::parse(&raw).map_err(|e| RequestError::InvalidUrl(format!("{}: {}", raw, e)).into())
    }

    /// Shapes the body and headers of a request.
    ///
    /// Content endpoints carry their parameters in the `Dropbox-API-Arg`
    /// header and the attached file, if any, as the body. Api endpoints carry
    /// their parameters as a JSON body. An empty body clears the content type.
    /// Headers are layered as authorization, then content type, then the
    /// request's own headers.
    pub async fn prepare_request(
        &self,
        request: &mut DropboxRequest,
    ) -> DropboxResult<(Url, HeaderMap, Option<Bytes>)> {
        let url = self.build_url(request.endpoint(), request.endpoint_type())?;

        let body = match request.endpoint_type() {
            EndpointType::Content => {
                let arg = request
                    .api_arg()
                    .map_err(|e| RequestError::Serialization(e.to_string()))?;
                let mut arg_header = HeaderMap::new();
                arg_header.insert(HeaderName::from_static(API_ARG_HEADER), header_value(&arg)?);
                request.set_headers(arg_header);

                match request.file() {
                    Some(file) => {
                        let contents = file.contents().await?;
                        request.set_content_type(OCTET_STREAM);
                        Some(contents)
                    }
                    None => None,
                }
            }
            EndpointType::Api => request
                .json_body()
                .map_err(|e| RequestError::Serialization(e.to_string()))?,
        };

        if body.is_none() {
            request.set_content_type("");
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = request.access_token() {
            headers.insert(
                AUTHORIZATION,
                header_value(&format!("Bearer {}", expose(token)))?,
            );
        }
        if !request.content_type().is_empty() {
            headers.insert(CONTENT_TYPE, header_value(request.content_type())?);
        }
        for (name, value) in request.headers().iter() {
            headers.insert(name.clone(), value.clone());
        }

        Ok((url, headers, body))
    }

    /// Sends a request and wraps the result.
    ///
    /// With a `sink`, the response body is streamed into it and the returned
    /// response reads its body back from the sink.
    pub async fn send_request(
        &self,
        mut request: DropboxRequest,
        sink: Option<DropboxFile>,
    ) -> DropboxResult<DropboxResponse> {
        let (url, headers, body) = self.prepare_request(&mut request).await?;

        debug!(
            method = request.method().as_str(),
            endpoint = request.endpoint(),
            endpoint_type = ?request.endpoint_type(),
            has_file = request.has_file(),
            to_sink = sink.is_some(),
            "Sending Dropbox request"
        );

        let raw = self
            .transport
            .send(HttpRequest {
                method: request.method(),
                url,
                headers,
                body,
                sink: sink.clone(),
            })
            .await
            .map_err(DropboxError::from)?;

        debug!(status = raw.status, endpoint = request.endpoint(), "Received Dropbox response");

        Ok(match sink {
            Some(sink) => DropboxResponse::to_file(request, raw.status, raw.headers, sink),
            None => DropboxResponse::new(request, raw.status, raw.headers, raw.body),
        })
    }
}

impl std::fmt::Debug for DropboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropboxClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn header_value(value: &str) -> DropboxResult<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| RequestError::InvalidHeader(e.to_string()).into())
}
