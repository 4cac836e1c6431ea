//! Integration tests using WireMock
//!
//! These tests run the complete request/response cycle against a mock HTTP
//! server: OAuth2 token exchange, CSRF validation, metadata calls and content
//! uploads/downloads.

mod auth_flow;
mod files;

use integrations_dropbox::{Dropbox, DropboxApp, DropboxConfig};
use serde_json::Value;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

pub const ACCESS_TOKEN: &str = "sl.test-token";
pub const CLIENT_ID: &str = "app-key";
pub const CLIENT_SECRET: &str = "app-secret";

/// Helper to create a mock server.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Configuration pointing every endpoint at the mock server.
pub fn config_for(server: &MockServer) -> DropboxConfig {
    DropboxConfig::builder()
        .api_url(format!("{}/2", server.uri()))
        .content_url(format!("{}/content/2", server.uri()))
        .authorize_url(format!("{}/oauth2/authorize", server.uri()))
        .token_url(format!("{}/oauth2/token", server.uri()))
        .build()
        .expect("valid mock configuration")
}

/// Client for an app holding [`ACCESS_TOKEN`].
pub fn client_for(server: &MockServer) -> Dropbox {
    Dropbox::new(
        DropboxApp::with_access_token(CLIENT_ID, CLIENT_SECRET, ACCESS_TOKEN),
        config_for(server),
    )
    .expect("client")
}

/// Client for an app without an access token.
pub fn unauthenticated_client_for(server: &MockServer) -> Dropbox {
    Dropbox::new(DropboxApp::new(CLIENT_ID, CLIENT_SECRET), config_for(server)).expect("client")
}

/// Helper to create an authenticated mock.
pub fn mock_with_auth(path_matcher: &str) -> MockBuilder {
    Mock::given(method("POST"))
        .and(path(path_matcher))
        .and(header("Authorization", format!("Bearer {}", ACCESS_TOKEN).as_str()))
}

/// Helper to create success response templates.
pub fn success_response(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(body)
}

/// Helper to create error response templates.
pub fn error_response(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}
