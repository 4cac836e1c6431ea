//! OAuth2 authorization URLs, token exchange and revocation.

use crate::client::DropboxClient;
use crate::config::{expose, DropboxApp};
use crate::errors::{AuthenticationError, DropboxResult, RequestError};
use crate::request::{DropboxRequest, VALIDATE_RESPONSE_PARAM};
use crate::transport::{HttpMethod, HttpRequest};
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::SecretString;
use serde_json::{Map, Value};
use tracing::{debug, info};
use url::Url;

/// Endpoint that invalidates an access token.
pub const REVOKE_ENDPOINT: &str = "/auth/token/revoke";

/// Grant used at the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrantType {
    /// Exchange an authorization code.
    #[default]
    AuthorizationCode,
    /// Exchange a refresh token.
    RefreshToken,
}

impl GrantType {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// Kind of token requested from the authorization endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAccessType {
    /// Short-lived access token plus a refresh token.
    Offline,
    /// Short-lived access token only.
    Online,
    /// Long-lived access token.
    Legacy,
}

impl TokenAccessType {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAccessType::Offline => "offline",
            TokenAccessType::Online => "online",
            TokenAccessType::Legacy => "legacy",
        }
    }
}

/// Talks to the Dropbox OAuth2 endpoints on behalf of an app.
#[derive(Debug, Clone)]
pub struct OAuth2Client {
    app: DropboxApp,
    client: DropboxClient,
}

impl OAuth2Client {
    /// Creates an OAuth2 client.
    pub fn new(app: DropboxApp, client: DropboxClient) -> Self {
        Self { app, client }
    }

    /// App credentials.
    pub fn app(&self) -> &DropboxApp {
        &self.app
    }

    /// Underlying API client.
    pub fn client(&self) -> &DropboxClient {
        &self.client
    }

    /// Builds the URL the user is sent to for authorization.
    ///
    /// Query parameters are `client_id`, `response_type=code`, `state` and
    /// `token_access_type`, in that order. `extra` entries replace a
    /// parameter of the same name or are appended. `redirect_uri` is set
    /// last when given. Parameters without a value are left out.
    pub fn build_authorization_url(
        &self,
        redirect_uri: Option<&str>,
        state: Option<&str>,
        extra: &[(&str, &str)],
        token_access_type: Option<TokenAccessType>,
    ) -> Url {
        let mut params: Vec<(String, Option<String>)> = vec![
            ("client_id".to_string(), Some(self.app.client_id().to_string())),
            ("response_type".to_string(), Some("code".to_string())),
            ("state".to_string(), state.map(str::to_string)),
            (
                "token_access_type".to_string(),
                token_access_type.map(|t| t.as_str().to_string()),
            ),
        ];

        for (key, value) in extra {
            set_param(&mut params, key, Some(value.to_string()));
        }
        if let Some(redirect_uri) = redirect_uri {
            set_param(&mut params, "redirect_uri", Some(redirect_uri.to_string()));
        }

        let mut url = self.client.config().authorize_url.clone();
        url.query_pairs_mut().clear().extend_pairs(
            params
                .iter()
                .filter_map(|(key, value)| value.as_ref().map(|value| (key, value))),
        );
        url
    }

    /// Exchanges an authorization code, or a refresh token when `grant_type`
    /// is [`GrantType::RefreshToken`], for token fields.
    pub async fn exchange_code_for_token(
        &self,
        code: &str,
        redirect_uri: Option<&str>,
        grant_type: GrantType,
    ) -> DropboxResult<Map<String, Value>> {
        let client_id = self.app.client_id();
        let client_secret = expose(self.app.client_secret());

        let mut form: Vec<(&str, &str)> = match grant_type {
            GrantType::AuthorizationCode => vec![
                ("code", code),
                ("grant_type", grant_type.as_str()),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
            GrantType::RefreshToken => vec![
                ("refresh_token", code),
                ("grant_type", grant_type.as_str()),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ],
        };
        if let (GrantType::AuthorizationCode, Some(redirect_uri)) = (grant_type, redirect_uri) {
            form.push(("redirect_uri", redirect_uri));
        }

        let body = serde_urlencoded::to_string(&form)
            .map_err(|e| RequestError::Serialization(e.to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        info!(grant_type = grant_type.as_str(), "Requesting access token");

        let response = self
            .client
            .transport()
            .send(HttpRequest {
                method: HttpMethod::Post,
                url: self.client.config().token_url.clone(),
                headers,
                body: Some(Bytes::from(body)),
                sink: None,
            })
            .await?;

        let decoded: Value = serde_json::from_slice(&response.body).map_err(|e| {
            AuthenticationError::TokenExchangeFailed(format!("Invalid token response: {}", e))
        })?;

        match decoded {
            Value::Object(fields) => {
                debug!(fields = fields.len(), "Received token response");
                Ok(fields)
            }
            other => Err(AuthenticationError::TokenExchangeFailed(format!(
                "Token response is not an object: {}",
                other
            ))
            .into()),
        }
    }

    /// Revokes the app's access token.
    pub async fn revoke_access_token(&self) -> DropboxResult<()> {
        let token = self
            .app
            .access_token()
            .ok_or(AuthenticationError::MissingAccessToken)?
            .clone();
        self.revoke(token).await
    }

    /// Revokes `token`.
    ///
    /// The endpoint answers with an empty body, so the response is not
    /// validated as JSON.
    pub async fn revoke(&self, token: SecretString) -> DropboxResult<()> {
        let mut params = Map::new();
        params.insert(VALIDATE_RESPONSE_PARAM.to_string(), Value::Bool(false));

        let request = DropboxRequest::post(REVOKE_ENDPOINT)
            .with_access_token(token)
            .with_params(params);

        let mut response = self.client.send_request(request, None).await?;
        response.decoded_body()?;

        info!("Access token revoked");
        Ok(())
    }
}

fn set_param(params: &mut Vec<(String, Option<String>)>, key: &str, value: Option<String>) {
    match params.iter_mut().find(|(existing, _)| existing == key) {
        Some(entry) => entry.1 = value,
        None => params.push((key.to_string(), value)),
    }
}
