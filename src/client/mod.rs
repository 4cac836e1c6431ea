//! Dropbox API client.

use crate::auth::{DropboxAuthHelper, OAuth2Client, PersistentDataStore, RandomStringGenerator};
use crate::config::{DropboxApp, DropboxConfig, DropboxConfigBuilder};
use crate::errors::{DropboxError, DropboxResult};
use crate::services::{FilesService, ServiceContext, UsersService};
use crate::transport::{HttpTransport, ReqwestTransport};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

mod executor;
pub use executor::{DropboxClient, API_ARG_HEADER, OCTET_STREAM};

/// Dropbox API client.
///
/// Entry point for the typed services and the OAuth2 flow.
///
/// # Example
///
/// ```no_run
/// use integrations_dropbox::{Dropbox, DropboxApp, DropboxConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let app = DropboxApp::with_access_token("app-key", "app-secret", "sl.token");
/// let dropbox = Dropbox::new(app, DropboxConfig::default())?;
///
/// let page = dropbox.files().list_folder("/", Default::default()).await?;
/// for item in page.items() {
///     println!("{:?}", item.path_display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Dropbox {
    app: DropboxApp,
    client: DropboxClient,
    access_token: Option<SecretString>,
}

impl Dropbox {
    /// Creates a client over the default reqwest transport.
    pub fn new(app: DropboxApp, config: DropboxConfig) -> DropboxResult<Self> {
        config.validate()?;

        let transport = ReqwestTransport::from_config(&config).map_err(|e| {
            DropboxError::configuration(format!("Failed to create transport: {}", e))
        })?;

        Ok(Self::with_transport(app, config, Arc::new(transport)))
    }

    /// Creates a client over a custom transport.
    pub fn with_transport(
        app: DropboxApp,
        config: DropboxConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let access_token = app.access_token().cloned();
        Self {
            app,
            client: DropboxClient::new(transport, config),
            access_token,
        }
    }

    /// Creates a new client builder.
    pub fn builder() -> DropboxBuilder {
        DropboxBuilder::new()
    }

    /// Replaces the access token used by the services, for example with
    /// one obtained through [`DropboxAuthHelper`].
    pub fn set_access_token(&mut self, token: SecretString) {
        self.access_token = Some(token);
    }

    /// Access the files service.
    pub fn files(&self) -> FilesService {
        FilesService::new(self.service_context())
    }

    /// Access the users service.
    pub fn users(&self) -> UsersService {
        UsersService::new(self.service_context())
    }

    /// OAuth2 client for this app.
    pub fn oauth2_client(&self) -> OAuth2Client {
        OAuth2Client::new(self.app.clone(), self.client.clone())
    }

    /// Authorization-code flow helper keeping its CSRF token in `store`.
    pub fn auth_helper(
        &self,
        store: Arc<dyn PersistentDataStore>,
        generator: Arc<dyn RandomStringGenerator>,
    ) -> DropboxAuthHelper {
        DropboxAuthHelper::new(self.oauth2_client(), generator, store)
    }

    /// The request pipeline (for advanced use cases).
    pub fn client(&self) -> &DropboxClient {
        &self.client
    }

    /// App credentials.
    pub fn app(&self) -> &DropboxApp {
        &self.app
    }

    /// Gets the configuration.
    pub fn config(&self) -> &DropboxConfig {
        self.client.config()
    }

    fn service_context(&self) -> ServiceContext {
        ServiceContext::new(self.client.clone(), self.access_token.clone())
    }
}

/// Builder for [`Dropbox`].
pub struct DropboxBuilder {
    app: Option<DropboxApp>,
    config_builder: DropboxConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl DropboxBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            app: None,
            config_builder: DropboxConfig::builder(),
            transport: None,
        }
    }

    /// Sets the app credentials.
    pub fn app(mut self, app: DropboxApp) -> Self {
        self.app = Some(app);
        self
    }

    /// Sets the metadata API root.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.api_url(url);
        self
    }

    /// Sets the content API root.
    pub fn content_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.content_url(url);
        self
    }

    /// Sets the authorization endpoint.
    pub fn authorize_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.authorize_url(url);
        self
    }

    /// Sets the token endpoint.
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.token_url(url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(user_agent);
        self
    }

    /// Sets a custom transport.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client. Credentials default to the environment.
    pub fn build(self) -> DropboxResult<Dropbox> {
        let app = match self.app {
            Some(app) => app,
            None => DropboxApp::from_env()?,
        };
        let config = self.config_builder.build()?;

        match self.transport {
            Some(transport) => Ok(Dropbox::with_transport(app, config, transport)),
            None => Dropbox::new(app, config),
        }
    }
}

impl Default for DropboxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
