//! Request description consumed by [`DropboxClient`](crate::client::DropboxClient).

use crate::file::DropboxFile;
use crate::transport::HttpMethod;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::SecretString;
use serde_json::{Map, Value};

/// Reserved parameter key that disables JSON validation of the response.
pub const VALIDATE_RESPONSE_PARAM: &str = "validateResponse";

/// Default content type of a request body.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Which API root an endpoint lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EndpointType {
    /// Metadata RPC endpoints; parameters travel as a JSON body.
    #[default]
    Api,
    /// Upload/download endpoints; parameters travel in a header.
    Content,
}

/// A single call against the Dropbox API.
#[derive(Debug, Clone)]
pub struct DropboxRequest {
    method: HttpMethod,
    endpoint: String,
    endpoint_type: EndpointType,
    access_token: Option<SecretString>,
    params: Map<String, Value>,
    headers: HeaderMap,
    file: Option<DropboxFile>,
    content_type: String,
    validate_response: bool,
}

impl DropboxRequest {
    /// Creates a request for a metadata endpoint with no parameters.
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            endpoint_type: EndpointType::Api,
            access_token: None,
            params: Map::new(),
            headers: HeaderMap::new(),
            file: None,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            validate_response: true,
        }
    }

    /// Shorthand for a POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    /// Sets the access token.
    pub fn with_access_token(mut self, token: SecretString) -> Self {
        self.access_token = Some(token);
        self
    }

    /// Sets the endpoint type.
    pub fn with_endpoint_type(mut self, endpoint_type: EndpointType) -> Self {
        self.endpoint_type = endpoint_type;
        self
    }

    /// Replaces the parameters. See [`set_params`](Self::set_params).
    pub fn with_params(mut self, params: Map<String, Value>) -> Self {
        self.set_params(params);
        self
    }

    /// Attaches a file to upload.
    pub fn with_file(mut self, file: DropboxFile) -> Self {
        self.file = Some(file);
        self
    }

    /// Adds a request-specific header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Replaces the parameters.
    ///
    /// A boolean under [`VALIDATE_RESPONSE_PARAM`] is removed from the
    /// parameters and controls response validation instead.
    pub fn set_params(&mut self, mut params: Map<String, Value>) {
        if let Some(flag) = params.remove(VALIDATE_RESPONSE_PARAM) {
            self.validate_response = flag.as_bool().unwrap_or(true);
        }
        self.params = params;
    }

    /// Merges headers over the existing ones; new values win.
    pub fn set_headers(&mut self, headers: HeaderMap) {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
    }

    /// Sets the content type.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = content_type.into();
    }

    /// Enables or disables JSON validation of the response body.
    pub fn set_validate_response(&mut self, validate: bool) {
        self.validate_response = validate;
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Endpoint path relative to its API root.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint type.
    pub fn endpoint_type(&self) -> EndpointType {
        self.endpoint_type
    }

    /// Access token.
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    /// Request parameters.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Request-specific headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Content type; empty when the body is empty.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Attached file.
    pub fn file(&self) -> Option<&DropboxFile> {
        self.file.as_ref()
    }

    /// Returns true if a file is attached.
    pub fn has_file(&self) -> bool {
        self.file.is_some()
    }

    /// Whether the response must decode as JSON.
    pub fn validate_response(&self) -> bool {
        self.validate_response
    }

    /// JSON-encoded parameters, or `None` when there are none.
    pub fn json_body(&self) -> Result<Option<Bytes>, serde_json::Error> {
        if self.params.is_empty() {
            return Ok(None);
        }
        serde_json::to_vec(&self.params).map(|body| Some(Bytes::from(body)))
    }

    /// Parameters encoded for the `Dropbox-API-Arg` header.
    ///
    /// Always a JSON object (`{}` when there are no parameters) with every
    /// character from U+007F upwards escaped as `\uXXXX`.
    pub fn api_arg(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.params).map(|json| header_safe_json(&json))
    }
}

/// Escapes non-ASCII and DEL characters in serialized JSON.
///
/// Such characters only ever occur inside JSON strings, where a `\uXXXX`
/// escape is equivalent.
pub fn header_safe_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for ch in json.chars() {
        if (ch as u32) < 0x7f {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            out.push_str(&format!("\\u{:04x}", unit));
        }
    }
    out
}
