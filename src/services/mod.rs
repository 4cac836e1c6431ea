//! Typed wrappers over the Dropbox endpoints.

mod files;
mod users;

pub use files::*;
pub use users::*;

use crate::client::DropboxClient;
use crate::errors::{AuthenticationError, DropboxResult, ResponseError};
use crate::file::DropboxFile;
use crate::request::DropboxRequest;
use crate::response::DropboxResponse;
use secrecy::SecretString;
use serde_json::{Map, Value};

/// Endpoint parameters.
pub type Params = Map<String, Value>;

/// What every service needs to issue authenticated calls.
#[derive(Debug, Clone)]
pub(crate) struct ServiceContext {
    client: DropboxClient,
    access_token: Option<SecretString>,
}

impl ServiceContext {
    pub(crate) fn new(client: DropboxClient, access_token: Option<SecretString>) -> Self {
        Self {
            client,
            access_token,
        }
    }

    /// An authenticated POST request to `endpoint`.
    fn request(&self, endpoint: &str) -> DropboxResult<DropboxRequest> {
        let token = self
            .access_token
            .clone()
            .ok_or(AuthenticationError::MissingAccessToken)?;
        Ok(DropboxRequest::post(endpoint).with_access_token(token))
    }

    async fn send(
        &self,
        request: DropboxRequest,
        sink: Option<DropboxFile>,
    ) -> DropboxResult<DropboxResponse> {
        self.client.send_request(request, sink).await
    }

    /// Sends `params` to an api endpoint and returns the decoded object.
    async fn call(&self, endpoint: &str, params: Params) -> DropboxResult<Map<String, Value>> {
        let request = self.request(endpoint)?.with_params(params);
        let mut response = self.send(request, None).await?;
        response.decoded_object()
    }
}

/// Builds parameters from `pairs`, then lays `extra` over them.
fn params<const N: usize>(pairs: [(&str, Value); N], extra: Params) -> Params {
    let mut params: Params = pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();
    params.extend(extra);
    params
}

/// Dropbox addresses the root folder as `""`.
fn normalize_path(path: &str) -> &str {
    if path == "/" {
        ""
    } else {
        path
    }
}

/// Takes the object under `key`.
fn take_object(mut body: Map<String, Value>, key: &str) -> DropboxResult<Map<String, Value>> {
    match body.remove(key) {
        Some(Value::Object(inner)) => Ok(inner),
        _ => Err(ResponseError::UnexpectedFormat(format!("response has no {:?} object", key)).into()),
    }
}
