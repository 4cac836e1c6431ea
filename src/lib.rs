//! Dropbox Integration Module
//!
//! Async client for the Dropbox HTTP API v2: OAuth2 authorization with CSRF
//! protection, a request pipeline that handles both the metadata (`api`) and
//! the upload/download (`content`) endpoint families, and typed models for
//! decoded responses.
//!
//! # Features
//!
//! - **OAuth2**: Authorization URLs, code and refresh-token exchange, revocation
//! - **CSRF**: Single-use state tokens kept in an injected store
//! - **Files**: Metadata, listings, search, create/delete/move/copy, links
//! - **Content**: Uploads from files or memory, downloads streamed to a sink
//! - **Models**: Responses classified by shape into a [`Model`] sum type
//!
//! # Example
//!
//! ```no_run
//! use integrations_dropbox::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dropbox = Dropbox::new(DropboxApp::from_env()?, DropboxConfig::default())?;
//!
//! // First leg: send the user to the authorization URL.
//! let mut helper = dropbox.auth_helper(
//!     Arc::new(InMemoryDataStore::new()),
//!     default_generator(),
//! );
//! let url = helper.build_auth_url(
//!     Some("https://example.com/callback"),
//!     &[],
//!     None,
//!     Some(TokenAccessType::Offline),
//! )?;
//! println!("Authorize at {}", url);
//!
//! // Second leg: the callback carries `code` and `state`.
//! let token = helper
//!     .exchange_code("code", Some("state"), Some("https://example.com/callback"))
//!     .await?;
//!
//! let mut dropbox = dropbox;
//! dropbox.set_access_token(token.access_token.clone());
//! let account = dropbox.users().get_current_account().await?;
//! println!("Hello, {}", account.display_name());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod file;
pub mod models;
pub mod request;
pub mod response;
pub mod services;
pub mod transport;

pub use client::{Dropbox, DropboxBuilder, DropboxClient};
pub use config::{DropboxApp, DropboxConfig, DropboxConfigBuilder};
pub use errors::{DropboxError, DropboxResult};
pub use file::{DropboxFile, FileMode};
pub use models::{AccessToken, Model, ModelFactory};
pub use request::{DropboxRequest, EndpointType};
pub use response::DropboxResponse;

/// Prelude module with commonly used types and traits.
///
/// ```no_run
/// use integrations_dropbox::prelude::*;
/// ```
pub mod prelude {
    // Client
    pub use crate::client::{Dropbox, DropboxBuilder, DropboxClient};

    // Configuration
    pub use crate::config::{DropboxApp, DropboxConfig};

    // Authentication
    pub use crate::auth::{
        default_generator, DropboxAuthHelper, GrantType, InMemoryDataStore, OAuth2Client,
        PersistentDataStore, RandomStringGenerator, TokenAccessType,
    };

    // Services
    pub use crate::services::{DownloadedFile, FilesService, Params, UsersService};

    // Models
    pub use crate::models::{
        AccessToken, Account, FileMetadata, FolderMetadata, JsonModel, MetadataCollection,
        Model, ModelFactory, SearchResults,
    };

    // Pipeline
    pub use crate::file::{DropboxFile, FileMode};
    pub use crate::request::{DropboxRequest, EndpointType};
    pub use crate::response::DropboxResponse;

    // Errors
    pub use crate::errors::{DropboxError, DropboxResult};
}
