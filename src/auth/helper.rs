//! Authorization-code flow with CSRF protection.

use super::oauth2::{GrantType, OAuth2Client, TokenAccessType};
use super::random::RandomStringGenerator;
use super::store::PersistentDataStore;
use crate::config::expose;
use crate::errors::{AuthenticationError, CsrfError, DropboxResult};
use crate::models::AccessToken;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Length of the generated CSRF token.
pub const CSRF_LENGTH: usize = 32;

/// Store key under which the CSRF token is kept.
pub const STATE_KEY: &str = "state";

/// Separates the CSRF token from caller state inside `state`.
const STATE_SEPARATOR: char = '|';

/// Drives the two legs of the authorization-code flow.
///
/// [`build_auth_url`](Self::build_auth_url) stores a fresh CSRF token and
/// embeds it in the `state` parameter; [`exchange_code`](Self::exchange_code)
/// checks the returned `state` against the stored token, consumes it and
/// trades the code for an [`AccessToken`].
pub struct DropboxAuthHelper {
    oauth2: OAuth2Client,
    generator: Arc<dyn RandomStringGenerator>,
    store: Arc<dyn PersistentDataStore>,
    url_state: Option<String>,
}

impl DropboxAuthHelper {
    /// Creates a helper.
    pub fn new(
        oauth2: OAuth2Client,
        generator: Arc<dyn RandomStringGenerator>,
        store: Arc<dyn PersistentDataStore>,
    ) -> Self {
        Self {
            oauth2,
            generator,
            store,
            url_state: None,
        }
    }

    /// The OAuth2 client.
    pub fn oauth2_client(&self) -> &OAuth2Client {
        &self.oauth2
    }

    /// The CSRF token store.
    pub fn persistent_data_store(&self) -> &Arc<dyn PersistentDataStore> {
        &self.store
    }

    /// Caller state decoded by the last [`exchange_code`](Self::exchange_code).
    pub fn url_state(&self) -> Option<&str> {
        self.url_state.as_deref()
    }

    /// Builds the authorization URL.
    ///
    /// Without a `redirect_uri` no CSRF token is generated and `state` is
    /// left out; the caller handles CSRF itself. Otherwise `state` is the
    /// new token, followed by `|url_state` when `url_state` is given.
    pub fn build_auth_url(
        &self,
        redirect_uri: Option<&str>,
        extra: &[(&str, &str)],
        url_state: Option<&str>,
        token_access_type: Option<TokenAccessType>,
    ) -> DropboxResult<Url> {
        let state = match redirect_uri {
            Some(_) => {
                let csrf = self.generator.generate(CSRF_LENGTH)?;
                self.store.set(STATE_KEY, csrf.clone());
                debug!("Stored CSRF token");
                Some(match url_state {
                    Some(url_state) => format!("{}{}{}", csrf, STATE_SEPARATOR, url_state),
                    None => csrf,
                })
            }
            None => None,
        };

        Ok(self.oauth2.build_authorization_url(
            redirect_uri,
            state.as_deref(),
            extra,
            token_access_type,
        ))
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// When `state` is given its CSRF part must match the stored token, which
    /// is then cleared so the same `state` cannot be used twice. Without
    /// `state` validation is skipped.
    pub async fn exchange_code(
        &mut self,
        code: &str,
        state: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> DropboxResult<AccessToken> {
        if let Some(state) = state {
            let (csrf, url_state) = decode_state(state);
            self.url_state = url_state.map(str::to_string);
            self.validate_csrf_token(csrf)?;
        }

        let fields = self
            .oauth2
            .exchange_code_for_token(code, redirect_uri, GrantType::AuthorizationCode)
            .await?;

        info!("Authorization code exchanged");
        AccessToken::from_data(fields)
    }

    /// Exchanges the refresh token of `token` for a new access token.
    ///
    /// The result keeps every field of `token` the refresh response does not
    /// replace.
    pub async fn refresh_token(
        &self,
        token: &AccessToken,
        grant_type: GrantType,
    ) -> DropboxResult<AccessToken> {
        let refresh = token
            .refresh()
            .ok_or(AuthenticationError::MissingRefreshToken)?;

        let fields = self
            .oauth2
            .exchange_code_for_token(expose(refresh), None, grant_type)
            .await?;

        info!("Access token refreshed");
        token.merged_with(fields)
    }

    /// Revokes the app's access token.
    pub async fn revoke_token(&self) -> DropboxResult<()> {
        self.oauth2.revoke_access_token().await
    }

    fn validate_csrf_token(&self, supplied: &str) -> DropboxResult<()> {
        let stored = self
            .store
            .get(STATE_KEY)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                warn!("No CSRF token in the persistent store");
                CsrfError::MissingStoredToken
            })?;

        if supplied.is_empty() {
            warn!("No CSRF token supplied");
            return Err(CsrfError::MissingSuppliedToken.into());
        }

        if stored != supplied {
            warn!("CSRF token mismatch");
            return Err(CsrfError::Mismatch.into());
        }

        self.store.clear(STATE_KEY);
        Ok(())
    }
}

/// Splits `state` on the first `|` into the CSRF token and caller state.
pub fn decode_state(state: &str) -> (&str, Option<&str>) {
    match state.split_once(STATE_SEPARATOR) {
        Some((csrf, url_state)) => (csrf, Some(url_state)),
        None => (state, None),
    }
}
