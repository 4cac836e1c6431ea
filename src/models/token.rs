//! Access token returned by the token endpoint.

use crate::config::expose;
use crate::errors::{AuthenticationError, DropboxResult};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Decoded token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    /// Bearer token.
    pub access_token: SecretString,
    /// Token type, usually `bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Refresh token, issued for offline access.
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    /// Granted scopes, space separated.
    #[serde(default)]
    pub scope: Option<String>,
    /// Account the token belongs to.
    #[serde(default)]
    pub account_id: Option<String>,
    /// Legacy user id.
    #[serde(default)]
    pub uid: Option<String>,
    /// Team id, for team-linked apps.
    #[serde(default)]
    pub team_id: Option<String>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AccessToken {
    /// Builds a token from a token endpoint response.
    pub fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        serde_json::from_value(Value::Object(data)).map_err(|e| {
            AuthenticationError::TokenExchangeFailed(format!("Malformed token response: {}", e))
                .into()
        })
    }

    /// The full field set, secrets included.
    pub fn data(&self) -> Map<String, Value> {
        let mut data = self.extra.clone();
        data.insert(
            "access_token".to_string(),
            Value::String(expose(&self.access_token).to_string()),
        );
        let optional = [
            ("token_type", self.token_type.clone()),
            ("refresh_token", self.refresh_token.as_ref().map(|t| expose(t).to_string())),
            ("scope", self.scope.clone()),
            ("account_id", self.account_id.clone()),
            ("uid", self.uid.clone()),
            ("team_id", self.team_id.clone()),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                data.insert(key.to_string(), Value::String(value));
            }
        }
        if let Some(expires_in) = self.expires_in {
            data.insert("expires_in".to_string(), Value::from(expires_in));
        }
        data
    }

    /// Layers `update` over this token's fields; fields absent from
    /// `update` keep their current values.
    pub fn merged_with(&self, update: Map<String, Value>) -> DropboxResult<Self> {
        let mut data = self.data();
        data.extend(update);
        Self::from_data(data)
    }

    /// Bearer token.
    pub fn token(&self) -> &SecretString {
        &self.access_token
    }

    /// Refresh token, if any.
    pub fn refresh(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }
}
