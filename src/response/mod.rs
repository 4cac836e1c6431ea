//! Responses returned by [`DropboxClient`](crate::client::DropboxClient).

use crate::errors::{DropboxResult, ResponseError};
use crate::file::DropboxFile;
use crate::request::DropboxRequest;
use bytes::Bytes;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use secrecy::SecretString;
use serde_json::{Map, Value};

/// Header carrying the result of a content download.
pub const API_RESULT_HEADER: &str = "dropbox-api-result";

#[derive(Debug)]
enum ResponseBody {
    Buffered(Bytes),
    Sink(DropboxFile),
}

/// A response to a [`DropboxRequest`].
///
/// The JSON body is decoded on first access and cached. When the request was
/// sent with a sink, the body lives in the sink and is never decoded.
#[derive(Debug)]
pub struct DropboxResponse {
    request: DropboxRequest,
    status: u16,
    headers: HeaderMap,
    body: ResponseBody,
    decoded: Option<Value>,
    #[cfg(test)]
    decodes: std::sync::atomic::AtomicUsize,
}

impl DropboxResponse {
    /// Creates a response with an in-memory body.
    pub fn new(request: DropboxRequest, status: u16, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            request,
            status,
            headers,
            body: ResponseBody::Buffered(body),
            decoded: None,
            #[cfg(test)]
            decodes: Default::default(),
        }
    }

    /// Creates a response whose body was streamed into `sink`.
    pub fn to_file(request: DropboxRequest, status: u16, headers: HeaderMap, sink: DropboxFile) -> Self {
        Self {
            request,
            status,
            headers,
            body: ResponseBody::Sink(sink),
            decoded: None,
            #[cfg(test)]
            decodes: Default::default(),
        }
    }

    /// The originating request.
    pub fn request(&self) -> &DropboxRequest {
        &self.request
    }

    /// Access token the request was sent with.
    pub fn access_token(&self) -> Option<&SecretString> {
        self.request.access_token()
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The sink the body was written to, if any.
    pub fn sink(&self) -> Option<&DropboxFile> {
        match &self.body {
            ResponseBody::Sink(file) => Some(file),
            ResponseBody::Buffered(_) => None,
        }
    }

    /// Raw body. For sink responses this reads the sink back.
    pub async fn body(&self) -> DropboxResult<Bytes> {
        match &self.body {
            ResponseBody::Buffered(bytes) => Ok(bytes.clone()),
            ResponseBody::Sink(file) => file.contents().await,
        }
    }

    /// Decoded JSON body, computed once and cached.
    ///
    /// Bodies without a JSON content type decode to an empty object. A JSON
    /// content type with a malformed body fails with
    /// [`ResponseError::InvalidResponse`] unless the request disabled
    /// validation, in which case it also yields an empty object.
    pub fn decoded_body(&mut self) -> DropboxResult<&Value> {
        let value = match self.decoded.take() {
            Some(value) => value,
            None => self.decode()?,
        };
        Ok(self.decoded.insert(value))
    }

    /// Decoded body as a JSON object; non-object bodies yield an empty map.
    pub fn decoded_object(&mut self) -> DropboxResult<Map<String, Value>> {
        Ok(self
            .decoded_body()?
            .as_object()
            .cloned()
            .unwrap_or_default())
    }

    /// Decodes the `Dropbox-API-Result` header, if present.
    pub fn api_result(&self) -> DropboxResult<Option<Map<String, Value>>> {
        let Some(raw) = self.headers.get(API_RESULT_HEADER) else {
            return Ok(None);
        };
        let raw = raw
            .to_str()
            .map_err(|e| ResponseError::UnexpectedFormat(format!("{} header: {}", API_RESULT_HEADER, e)))?;
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| ResponseError::DeserializationError(format!("{} header: {}", API_RESULT_HEADER, e)))?;
        match value {
            Value::Object(map) => Ok(Some(map)),
            other => Err(ResponseError::UnexpectedFormat(format!(
                "{} header is not an object: {}",
                API_RESULT_HEADER, other
            ))
            .into()),
        }
    }

    fn is_json(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("application/json"))
            .unwrap_or(false)
    }

    fn decode(&self) -> DropboxResult<Value> {
        #[cfg(test)]
        let _ = self
            .decodes
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        let empty = Value::Object(Map::new());
        let bytes = match &self.body {
            ResponseBody::Sink(_) => return Ok(empty),
            ResponseBody::Buffered(bytes) => bytes,
        };

        if !self.is_json() {
            return Ok(empty);
        }

        match serde_json::from_slice(bytes) {
            Ok(value) => Ok(value),
            Err(e) if self.request.validate_response() => {
                Err(ResponseError::InvalidResponse(e.to_string()).into())
            }
            Err(_) => Ok(empty),
        }
    }
}
