//! Authorization-code flow against a mock token endpoint.

use super::*;
use integrations_dropbox::auth::{
    GrantType, InMemoryDataStore, PersistentDataStore, RingRandomStringGenerator, TokenAccessType,
    STATE_KEY,
};
use integrations_dropbox::errors::{CsrfError, DropboxError};
use integrations_dropbox::AccessToken;
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::body_string;

const REDIRECT_URI: &str = "https://app.example.com/callback";

fn state_of(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
        .expect("state parameter")
}

fn token_request_body(code: &str) -> String {
    format!(
        "code={}&grant_type=authorization_code&client_id={}&client_secret={}&redirect_uri={}",
        code,
        CLIENT_ID,
        CLIENT_SECRET,
        "https%3A%2F%2Fapp.example.com%2Fcallback"
    )
}

#[tokio::test]
async fn test_authorization_round_trip() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string(token_request_body("auth-code")))
        .respond_with(success_response(json!({
            "access_token": "sl.issued",
            "token_type": "bearer",
            "expires_in": 14400,
            "refresh_token": "r.issued",
            "scope": "files.content.read",
            "account_id": "dbid:AAH4f99",
            "uid": "12345"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dropbox = unauthenticated_client_for(&server);
    let store = Arc::new(InMemoryDataStore::new());
    let mut helper = dropbox.auth_helper(store.clone(), Arc::new(RingRandomStringGenerator::new()));

    let url = helper
        .build_auth_url(Some(REDIRECT_URI), &[], Some("return_to=/inbox"), Some(TokenAccessType::Offline))
        .unwrap();
    assert!(url.as_str().starts_with(&format!("{}/oauth2/authorize?client_id=app-key", server.uri())));
    assert!(url.query_pairs().any(|(k, v)| k == "token_access_type" && v == "offline"));

    let state = state_of(&url);
    let (csrf, url_state) = state.split_once('|').unwrap();
    assert_eq!(csrf.len(), 32);
    assert_eq!(url_state, "return_to=/inbox");
    assert_eq!(store.get(STATE_KEY).as_deref(), Some(csrf));

    let token = helper
        .exchange_code("auth-code", Some(&state), Some(REDIRECT_URI))
        .await
        .unwrap();

    assert_eq!(token.access_token.expose_secret(), "sl.issued");
    assert_eq!(token.refresh_token.as_ref().unwrap().expose_secret(), "r.issued");
    assert_eq!(token.account_id.as_deref(), Some("dbid:AAH4f99"));
    assert_eq!(helper.url_state(), Some("return_to=/inbox"));
    assert_eq!(store.get(STATE_KEY), None);
}

#[tokio::test]
async fn test_state_cannot_be_replayed() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(success_response(json!({"access_token": "sl.once"})))
        .expect(1)
        .mount(&server)
        .await;

    let dropbox = unauthenticated_client_for(&server);
    let mut helper = dropbox.auth_helper(
        Arc::new(InMemoryDataStore::new()),
        Arc::new(RingRandomStringGenerator::new()),
    );

    let url = helper.build_auth_url(Some(REDIRECT_URI), &[], None, None).unwrap();
    let state = state_of(&url);

    helper
        .exchange_code("auth-code", Some(&state), Some(REDIRECT_URI))
        .await
        .unwrap();
    let err = helper
        .exchange_code("auth-code", Some(&state), Some(REDIRECT_URI))
        .await
        .unwrap_err();

    assert!(err.is_csrf());
    assert!(matches!(err, DropboxError::Csrf(CsrfError::MissingStoredToken)));
}

#[tokio::test]
async fn test_tampered_state_is_rejected() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(success_response(json!({"access_token": "sl.never"})))
        .expect(0)
        .mount(&server)
        .await;

    let dropbox = unauthenticated_client_for(&server);
    let mut helper = dropbox.auth_helper(
        Arc::new(InMemoryDataStore::new()),
        Arc::new(RingRandomStringGenerator::new()),
    );

    let url = helper.build_auth_url(Some(REDIRECT_URI), &[], Some("keep"), None).unwrap();
    let state = state_of(&url);

    let mut tampered: Vec<char> = state.chars().collect();
    tampered[0] = if tampered[0] == 'a' { 'b' } else { 'a' };
    let tampered: String = tampered.into_iter().collect();

    let err = helper
        .exchange_code("auth-code", Some(&tampered), Some(REDIRECT_URI))
        .await
        .unwrap_err();

    assert!(matches!(err, DropboxError::Csrf(CsrfError::Mismatch)));
    assert_eq!(err.to_string(), "Invalid CSRF Token. CSRF Token Mismatch.");
}

#[tokio::test]
async fn test_refresh_merges_over_existing_token() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string(format!(
            "refresh_token=R&grant_type=refresh_token&client_id={}&client_secret={}",
            CLIENT_ID, CLIENT_SECRET
        )))
        .respond_with(success_response(json!({"access_token": "B", "expires_in": 14400})))
        .expect(1)
        .mount(&server)
        .await;

    let dropbox = unauthenticated_client_for(&server);
    let helper = dropbox.auth_helper(
        Arc::new(InMemoryDataStore::new()),
        Arc::new(RingRandomStringGenerator::new()),
    );

    let existing = AccessToken::from_data(
        json!({"access_token": "A", "refresh_token": "R", "scope": "files"})
            .as_object()
            .cloned()
            .unwrap(),
    )
    .unwrap();

    let refreshed = helper
        .refresh_token(&existing, GrantType::RefreshToken)
        .await
        .unwrap();

    assert_eq!(
        serde_json::Value::Object(refreshed.data()),
        json!({"access_token": "B", "refresh_token": "R", "scope": "files", "expires_in": 14400})
    );
}

#[tokio::test]
async fn test_token_endpoint_error_surfaces_body() {
    let server = setup_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(error_response(
            400,
            json!({"error": "invalid_grant", "error_description": "code doesn't exist or has expired"}),
        ))
        .mount(&server)
        .await;

    let dropbox = unauthenticated_client_for(&server);
    let err = dropbox
        .oauth2_client()
        .exchange_code_for_token("stale", None, GrantType::AuthorizationCode)
        .await
        .unwrap_err();

    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(400));
    assert!(err.to_string().contains("invalid_grant"));
}

#[tokio::test]
async fn test_revoke_with_empty_body() {
    let server = setup_mock_server().await;
    mock_with_auth("/2/auth/token/revoke")
        .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let dropbox = client_for(&server);
    let helper = dropbox.auth_helper(
        Arc::new(InMemoryDataStore::new()),
        Arc::new(RingRandomStringGenerator::new()),
    );

    helper.revoke_token().await.unwrap();
}
