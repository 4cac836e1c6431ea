//! Files endpoints against a mock Dropbox API.

use super::*;
use integrations_dropbox::{DropboxFile, FileMode, Model};
use serde_json::json;
use wiremock::matchers::body_json;

fn file_entry(id: &str, name: &str) -> Value {
    json!({
        ".tag": "file",
        "id": id,
        "name": name,
        "path_lower": format!("/docs/{}", name.to_lowercase()),
        "path_display": format!("/docs/{}", name),
        "rev": "015f0e5d2",
        "size": 12,
        "server_modified": "2026-03-01T10:00:00Z"
    })
}

#[tokio::test]
async fn test_list_folder_and_continue() {
    let server = setup_mock_server().await;

    mock_with_auth("/2/files/list_folder")
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"path": "", "recursive": true})))
        .respond_with(success_response(json!({
            "entries": [
                file_entry("id:a", "Report.pdf"),
                {".tag": "folder", "id": "id:b", "name": "Archive", "path_display": "/docs/Archive"}
            ],
            "cursor": "cursor-1",
            "has_more": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    mock_with_auth("/2/files/list_folder/continue")
        .and(body_json(json!({"cursor": "cursor-1"})))
        .respond_with(success_response(json!({
            "entries": [{"name": "gone.txt", "path_lower": "/docs/gone.txt"}],
            "cursor": "cursor-2",
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = client_for(&server).files();

    let mut extra = serde_json::Map::new();
    extra.insert("recursive".to_string(), json!(true));
    let first = files.list_folder("/", extra).await.unwrap();

    assert_eq!(first.items().len(), 2);
    assert!(matches!(first.items()[0], Model::File(_)));
    assert!(matches!(first.items()[1], Model::Folder(_)));
    assert_eq!(first.items()[1].path_display(), Some("/docs/Archive"));
    assert!(first.has_more_items());

    let next = files.list_folder_continue(first.cursor()).await.unwrap();
    assert_eq!(next.cursor(), "cursor-2");
    assert!(!next.has_more_items());
    assert!(matches!(next.items()[0], Model::Deleted(_)));
}

#[tokio::test]
async fn test_get_metadata_classifies_file() {
    let server = setup_mock_server().await;
    mock_with_auth("/2/files/get_metadata")
        .and(body_json(json!({"path": "/docs/Report.pdf"})))
        .respond_with(success_response(file_entry("id:a", "Report.pdf")))
        .mount(&server)
        .await;

    let model = client_for(&server)
        .files()
        .get_metadata("/docs/Report.pdf", Default::default())
        .await
        .unwrap();

    let file = model.as_file().expect("file metadata");
    assert_eq!(file.id, "id:a");
    assert_eq!(file.size, 12);
    assert_eq!(file.rev.as_deref(), Some("015f0e5d2"));
}

#[tokio::test]
async fn test_search_v2() {
    let server = setup_mock_server().await;
    mock_with_auth("/2/files/search_v2")
        .and(body_json(json!({
            "query": "report",
            "options": {"path": "/docs", "max_results": 5}
        })))
        .respond_with(success_response(json!({
            "matches": [{
                "match_type": {".tag": "filename"},
                "metadata": {".tag": "metadata", "metadata": file_entry("id:a", "Report.pdf")}
            }],
            "has_more": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut options = serde_json::Map::new();
    options.insert("max_results".to_string(), json!(5));
    let results = client_for(&server)
        .files()
        .search("/docs", "report", options)
        .await
        .unwrap();

    assert_eq!(results.items().len(), 1);
    let hit = &results.items()[0];
    assert_eq!(hit.match_type(), Some("filename"));
    assert!(matches!(hit.metadata(), Some(Model::File(_))));
    assert!(!results.has_more_items());
}

#[tokio::test]
async fn test_upload_from_local_file() {
    let server = setup_mock_server().await;
    mock_with_auth("/content/2/files/upload")
        .and(header("content-type", "application/octet-stream"))
        .respond_with(success_response(file_entry("id:up", "notes.txt")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("notes.txt");
    std::fs::write(&local, b"hello dropbox").unwrap();

    let mut extra = serde_json::Map::new();
    extra.insert("mode".to_string(), json!("overwrite"));
    let metadata = client_for(&server)
        .files()
        .upload(
            DropboxFile::from_path(&local, FileMode::Read),
            "/docs/notes.txt",
            extra,
        )
        .await
        .unwrap();

    assert_eq!(metadata.id, "id:up");

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].body, b"hello dropbox".to_vec());
    let api_arg: Value = serde_json::from_slice(
        received[0].headers.get("dropbox-api-arg").unwrap().as_bytes(),
    )
    .unwrap();
    assert_eq!(api_arg, json!({"path": "/docs/notes.txt", "mode": "overwrite"}));
}

#[tokio::test]
async fn test_download_into_local_sink() {
    let server = setup_mock_server().await;
    let result = file_entry("id:dl", "notes.txt").to_string();
    mock_with_auth("/content/2/files/download")
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .insert_header("dropbox-api-result", result.as_str())
                .set_body_bytes(b"downloaded bytes".to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("copy.txt");

    let downloaded = client_for(&server)
        .files()
        .download(
            "/docs/notes.txt",
            Some(DropboxFile::from_path(&target, FileMode::Write)),
        )
        .await
        .unwrap();

    assert_eq!(downloaded.metadata().id, "id:dl");
    assert_eq!(std::fs::read(&target).unwrap(), b"downloaded bytes".to_vec());
    assert_eq!(&downloaded.contents().await.unwrap()[..], b"downloaded bytes");

    let received = server.received_requests().await.unwrap();
    assert!(received[0].body.is_empty());
    assert!(received[0].headers.get("content-type").is_none());
}

#[tokio::test]
async fn test_conflict_error_surfaces() {
    let server = setup_mock_server().await;
    mock_with_auth("/2/files/delete_v2")
        .respond_with(error_response(
            409,
            json!({"error_summary": "path_lookup/not_found/", "error": {".tag": "path_lookup"}}),
        ))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .files()
        .delete("/missing.txt")
        .await
        .unwrap_err();

    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(409));
    assert!(err.to_string().contains("path_lookup/not_found/"));
}

#[tokio::test]
async fn test_requests_without_token_are_rejected_locally() {
    let server = setup_mock_server().await;

    let err = unauthenticated_client_for(&server)
        .users()
        .get_current_account()
        .await
        .unwrap_err();

    assert!(err.to_string().contains("No access token available"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
