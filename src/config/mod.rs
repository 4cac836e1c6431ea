//! Configuration for the Dropbox client.

use crate::errors::{ConfigurationError, DropboxError, DropboxResult};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default metadata API root.
pub const DEFAULT_API_URL: &str = "https://api.dropboxapi.com/2";

/// Default content (upload/download) API root.
pub const DEFAULT_CONTENT_URL: &str = "https://content.dropboxapi.com/2";

/// Default OAuth2 authorization endpoint.
pub const DEFAULT_AUTHORIZE_URL: &str = "https://www.dropbox.com/oauth2/authorize";

/// Default OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.dropboxapi.com/oauth2/token";

/// App credentials registered with Dropbox.
#[derive(Clone)]
pub struct DropboxApp {
    client_id: String,
    client_secret: SecretString,
    access_token: Option<SecretString>,
}

impl DropboxApp {
    /// Creates app credentials without a long-lived access token.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            access_token: None,
        }
    }

    /// Creates app credentials carrying an access token.
    pub fn with_access_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: Some(SecretString::new(access_token.into())),
            ..Self::new(client_id, client_secret)
        }
    }

    /// Reads `DROPBOX_CLIENT_ID`, `DROPBOX_CLIENT_SECRET` and the optional
    /// `DROPBOX_ACCESS_TOKEN` from the environment.
    pub fn from_env() -> DropboxResult<Self> {
        let client_id = std::env::var("DROPBOX_CLIENT_ID").map_err(|_| {
            ConfigurationError::MissingCredentials("DROPBOX_CLIENT_ID is not set".to_string())
        })?;
        let client_secret = std::env::var("DROPBOX_CLIENT_SECRET").map_err(|_| {
            ConfigurationError::MissingCredentials("DROPBOX_CLIENT_SECRET is not set".to_string())
        })?;

        let app = match std::env::var("DROPBOX_ACCESS_TOKEN") {
            Ok(token) if !token.is_empty() => {
                Self::with_access_token(client_id, client_secret, token)
            }
            _ => Self::new(client_id, client_secret),
        };
        Ok(app)
    }

    /// Client identifier.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret.
    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    /// Long-lived access token, if one was supplied.
    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }
}

impl std::fmt::Debug for DropboxApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropboxApp")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Configuration for the Dropbox client.
#[derive(Clone, Debug)]
pub struct DropboxConfig {
    /// Root for metadata (`api`) endpoints.
    pub api_url: Url,

    /// Root for content (upload/download) endpoints.
    pub content_url: Url,

    /// OAuth2 authorization endpoint.
    pub authorize_url: Url,

    /// OAuth2 token endpoint.
    pub token_url: Url,

    /// Default timeout for requests.
    pub timeout: Duration,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// User agent string.
    pub user_agent: String,
}

impl DropboxConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> DropboxConfigBuilder {
        DropboxConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DropboxResult<()> {
        for (name, url) in [
            ("API URL", &self.api_url),
            ("content URL", &self.content_url),
            ("authorize URL", &self.authorize_url),
            ("token URL", &self.token_url),
        ] {
            if !matches!(url.scheme(), "https" | "http") {
                return Err(DropboxError::configuration(format!(
                    "{} must use HTTP(S), got {}",
                    name,
                    url.scheme()
                )));
            }
        }

        if self.timeout.is_zero() {
            return Err(DropboxError::configuration("Timeout must be non-zero"));
        }

        Ok(())
    }
}

impl Default for DropboxConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("valid default API URL"),
            content_url: Url::parse(DEFAULT_CONTENT_URL).expect("valid default content URL"),
            authorize_url: Url::parse(DEFAULT_AUTHORIZE_URL)
                .expect("valid default authorize URL"),
            token_url: Url::parse(DEFAULT_TOKEN_URL).expect("valid default token URL"),
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("integrations-dropbox/{}", env!("CARGO_PKG_VERSION"))
}

/// Builder for DropboxConfig.
pub struct DropboxConfigBuilder {
    api_url: Option<String>,
    content_url: Option<String>,
    authorize_url: Option<String>,
    token_url: Option<String>,
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: Option<String>,
}

impl DropboxConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            api_url: None,
            content_url: None,
            authorize_url: None,
            token_url: None,
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            user_agent: None,
        }
    }

    /// Sets the metadata API root.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the content API root.
    pub fn content_url(mut self, url: impl Into<String>) -> Self {
        self.content_url = Some(url.into());
        self
    }

    /// Sets the authorization endpoint.
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.authorize_url = Some(url.into());
        self
    }

    /// Sets the token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = Some(url.into());
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> DropboxResult<DropboxConfig> {
        let parse = |value: Option<String>, default: &str| -> DropboxResult<Url> {
            let raw = value.as_deref().unwrap_or(default);
            Url::parse(raw).map_err(|e| {
                DropboxError::configuration(format!("Invalid URL {:?}: {}", raw, e))
            })
        };

        let config = DropboxConfig {
            api_url: parse(self.api_url, DEFAULT_API_URL)?,
            content_url: parse(self.content_url, DEFAULT_CONTENT_URL)?,
            authorize_url: parse(self.authorize_url, DEFAULT_AUTHORIZE_URL)?,
            token_url: parse(self.token_url, DEFAULT_TOKEN_URL)?,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
        };

        config.validate()?;

        Ok(config)
    }
}

impl Default for DropboxConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Exposes a secret for a header or form value.
pub(crate) fn expose(secret: &SecretString) -> &str {
    secret.expose_secret()
}
