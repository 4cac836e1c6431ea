//! Error types for the Dropbox integration.
//!
//! Every failure surfaces as a [`DropboxError`]; the wrapped sub-enum tells
//! callers which layer rejected the operation.

use reqwest::StatusCode;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Dropbox operations.
pub type DropboxResult<T> = Result<T, DropboxError>;

/// Top-level error type for the Dropbox integration.
#[derive(Debug, Error)]
pub enum DropboxError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// CSRF validation error.
    #[error("Invalid CSRF Token. {0}")]
    Csrf(#[from] CsrfError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthenticationError),

    /// Request construction error.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Response decoding error.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Local file error.
    #[error("File error: {0}")]
    File(#[from] FileError),

    /// Transport error.
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),
}

impl DropboxError {
    /// Creates a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        DropboxError::Configuration(ConfigurationError::InvalidConfiguration(msg.into()))
    }

    /// Creates a request error.
    pub fn request(msg: impl Into<String>) -> Self {
        DropboxError::Request(RequestError::ValidationError(msg.into()))
    }

    /// Creates a deserialization error.
    pub fn deserialization(msg: impl Into<String>) -> Self {
        DropboxError::Response(ResponseError::DeserializationError(msg.into()))
    }

    /// Returns true if the error came from CSRF validation.
    pub fn is_csrf(&self) -> bool {
        matches!(self, DropboxError::Csrf(_))
    }

    /// Returns the HTTP status code reported by the server, if any.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            DropboxError::Transport(TransportError::Http { status, .. }) => {
                StatusCode::from_u16(*status).ok()
            }
            _ => None,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing credentials.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Unknown persistent data store selector.
    #[error("The persistent data store must be \"memory\" or \"session\", got {0:?}")]
    UnknownDataStore(String),

    /// Unknown random string generator selector.
    #[error("The random string generator must be \"ring\" or \"os\", got {0:?}")]
    UnknownRandomGenerator(String),

    /// No cryptographically secure generator is usable on this host.
    #[error("Unable to use a cryptographically secure pseudo-random string generator: {0}")]
    NoSecureGenerator(String),
}

/// CSRF validation failures raised while exchanging an authorization code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CsrfError {
    /// No token was persisted by a previous authorization URL.
    #[error("Unable to validate CSRF Token: no token in the persistent store.")]
    MissingStoredToken,

    /// The callback did not carry a token.
    #[error("Unable to validate CSRF Token: no token supplied.")]
    MissingSuppliedToken,

    /// The supplied token differs from the persisted one.
    #[error("CSRF Token Mismatch.")]
    Mismatch,
}

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthenticationError {
    /// Token endpoint rejected or garbled the exchange.
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// The app has no access token configured.
    #[error("No access token available")]
    MissingAccessToken,

    /// The token being refreshed carries no refresh token.
    #[error("No refresh token available")]
    MissingRefreshToken,
}

/// Request errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Validation error.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid header value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Parameters could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Response errors.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Body could not be validated as JSON.
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),

    /// Deserialization error.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// Unexpected format.
    #[error("Unexpected response format: {0}")]
    UnexpectedFormat(String),
}

/// Local file errors.
#[derive(Debug, Error)]
pub enum FileError {
    /// Source is not readable.
    #[error("Unable to read resource: {0}")]
    NotReadable(PathBuf),

    /// Destination is not writable.
    #[error("Unable to write resource: {0}")]
    NotWritable(PathBuf),

    /// Remote resources are not opened locally.
    #[error("Unable to open remote resource: {0}")]
    RemoteNotSupported(String),

    /// I/O failure while reading or writing.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network error.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Non-success HTTP status; `body` is the server's response text.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Streaming the body into a sink failed on the local side.
    #[error("Sink error: {0}")]
    Sink(#[from] FileError),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

impl From<TransportError> for DropboxError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Sink(file) => DropboxError::File(file),
            other => DropboxError::Transport(other),
        }
    }
}
