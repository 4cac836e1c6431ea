//! Files service: metadata, listings, search, file operations, upload and
//! download.

use super::{normalize_path, params, take_object, Params, ServiceContext};
use crate::errors::{DropboxResult, ResponseError};
use crate::file::DropboxFile;
use crate::models::{
    CopyReference, FileMetadata, FolderMetadata, JsonModel, MetadataCollection, Model,
    ModelFactory, SearchResults, TemporaryLink,
};
use crate::request::EndpointType;
use crate::response::DropboxResponse;
use bytes::Bytes;
use serde_json::{json, Value};
use tracing::debug;

/// Service for file operations.
#[derive(Debug, Clone)]
pub struct FilesService {
    ctx: ServiceContext,
}

impl FilesService {
    pub(crate) fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Metadata of a file or folder.
    ///
    /// `extra` carries optional endpoint parameters such as
    /// `include_media_info`.
    pub async fn get_metadata(&self, path: &str, extra: Params) -> DropboxResult<Model> {
        let body = self
            .ctx
            .call("/files/get_metadata", params([("path", json!(path))], extra))
            .await?;
        ModelFactory::make(body)
    }

    /// First page of a folder's contents. `"/"` lists the root.
    pub async fn list_folder(&self, path: &str, extra: Params) -> DropboxResult<MetadataCollection> {
        let body = self
            .ctx
            .call(
                "/files/list_folder",
                params([("path", json!(normalize_path(path)))], extra),
            )
            .await?;
        MetadataCollection::from_data(body)
    }

    /// Next page of a folder listing.
    pub async fn list_folder_continue(&self, cursor: &str) -> DropboxResult<MetadataCollection> {
        let body = self
            .ctx
            .call(
                "/files/list_folder/continue",
                params([("cursor", json!(cursor))], Params::new()),
            )
            .await?;
        MetadataCollection::from_data(body)
    }

    /// Searches under `path` for `query`.
    ///
    /// `options` are merged into the search options next to `path`.
    pub async fn search(&self, path: &str, query: &str, options: Params) -> DropboxResult<SearchResults> {
        let options = params([("path", json!(normalize_path(path)))], options);
        let body = self
            .ctx
            .call(
                "/files/search_v2",
                params(
                    [("query", json!(query)), ("options", Value::Object(options))],
                    Params::new(),
                ),
            )
            .await?;
        SearchResults::from_data(body)
    }

    /// Creates a folder.
    pub async fn create_folder(&self, path: &str, autorename: bool) -> DropboxResult<FolderMetadata> {
        let body = self
            .ctx
            .call(
                "/files/create_folder_v2",
                params(
                    [("path", json!(path)), ("autorename", json!(autorename))],
                    Params::new(),
                ),
            )
            .await?;
        FolderMetadata::from_data(take_object(body, "metadata")?)
    }

    /// Deletes a file or folder, returning its metadata.
    pub async fn delete(&self, path: &str) -> DropboxResult<Model> {
        let body = self
            .ctx
            .call("/files/delete_v2", params([("path", json!(path))], Params::new()))
            .await?;
        ModelFactory::make(take_object(body, "metadata")?)
    }

    /// Moves a file or folder.
    pub async fn move_path(&self, from_path: &str, to_path: &str, extra: Params) -> DropboxResult<Model> {
        self.relocate("/files/move_v2", from_path, to_path, extra).await
    }

    /// Copies a file or folder.
    pub async fn copy_path(&self, from_path: &str, to_path: &str, extra: Params) -> DropboxResult<Model> {
        self.relocate("/files/copy_v2", from_path, to_path, extra).await
    }

    async fn relocate(
        &self,
        endpoint: &str,
        from_path: &str,
        to_path: &str,
        extra: Params,
    ) -> DropboxResult<Model> {
        let body = self
            .ctx
            .call(
                endpoint,
                params(
                    [("from_path", json!(from_path)), ("to_path", json!(to_path))],
                    extra,
                ),
            )
            .await?;
        ModelFactory::make(take_object(body, "metadata")?)
    }

    /// A temporary direct download link to a file.
    pub async fn get_temporary_link(&self, path: &str) -> DropboxResult<TemporaryLink> {
        let body = self
            .ctx
            .call(
                "/files/get_temporary_link",
                params([("path", json!(path))], Params::new()),
            )
            .await?;
        TemporaryLink::from_data(body)
    }

    /// A copy reference for a file or folder.
    pub async fn get_copy_reference(&self, path: &str) -> DropboxResult<CopyReference> {
        let body = self
            .ctx
            .call(
                "/files/copy_reference/get",
                params([("path", json!(path))], Params::new()),
            )
            .await?;
        CopyReference::from_data(body)
    }

    /// Saves the entry behind a copy reference to `path`.
    pub async fn save_copy_reference(&self, path: &str, copy_reference: &str) -> DropboxResult<Model> {
        let body = self
            .ctx
            .call(
                "/files/copy_reference/save",
                params(
                    [("path", json!(path)), ("copy_reference", json!(copy_reference))],
                    Params::new(),
                ),
            )
            .await?;
        ModelFactory::make(take_object(body, "metadata")?)
    }

    /// Uploads `file` to `path`.
    ///
    /// `extra` carries optional parameters such as `mode` or `autorename`.
    pub async fn upload(&self, file: DropboxFile, path: &str, extra: Params) -> DropboxResult<FileMetadata> {
        debug!(path, file = %file.file_name(), "Uploading file");

        let request = self
            .ctx
            .request("/files/upload")?
            .with_endpoint_type(EndpointType::Content)
            .with_params(params([("path", json!(path))], extra))
            .with_file(file);

        let mut response = self.ctx.send(request, None).await?;
        FileMetadata::from_data(response.decoded_object()?)
    }

    /// Downloads the file at `path`.
    ///
    /// With a `sink` the contents are streamed into it; otherwise they are
    /// held in memory.
    pub async fn download(&self, path: &str, sink: Option<DropboxFile>) -> DropboxResult<DownloadedFile> {
        debug!(path, to_sink = sink.is_some(), "Downloading file");

        let request = self
            .ctx
            .request("/files/download")?
            .with_endpoint_type(EndpointType::Content)
            .with_params(params([("path", json!(path))], Params::new()));

        let response = self.ctx.send(request, sink).await?;
        let metadata = response.api_result()?.ok_or_else(|| {
            ResponseError::UnexpectedFormat("download response has no Dropbox-API-Result header".to_string())
        })?;

        Ok(DownloadedFile {
            metadata: FileMetadata::from_data(metadata)?,
            response,
        })
    }
}

/// A downloaded file: its metadata and its contents.
#[derive(Debug)]
pub struct DownloadedFile {
    metadata: FileMetadata,
    response: DropboxResponse,
}

impl DownloadedFile {
    /// Metadata of the downloaded file.
    pub fn metadata(&self) -> &FileMetadata {
        &self.metadata
    }

    /// File contents, read back from the sink when one was used.
    pub async fn contents(&self) -> DropboxResult<Bytes> {
        self.response.body().await
    }

    /// The sink the contents were written to, if any.
    pub fn sink(&self) -> Option<&DropboxFile> {
        self.response.sink()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::DropboxClient;
    use crate::config::DropboxConfig;
    use crate::errors::{AuthenticationError, DropboxError};
    use crate::transport::{MockTransport, RawResponse};
    use reqwest::header::{HeaderMap, HeaderValue};
    use secrecy::SecretString;
    use std::sync::Arc;

    fn files() -> (Arc<MockTransport>, FilesService) {
        let transport = Arc::new(MockTransport::new());
        let client = DropboxClient::new(transport.clone(), DropboxConfig::default());
        let ctx = ServiceContext::new(client, Some(SecretString::new("sl.test".to_string())));
        (transport, FilesService::new(ctx))
    }

    fn sent_json(transport: &MockTransport) -> Value {
        serde_json::from_slice(&transport.last_request().unwrap().body.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_list_folder_root() {
        let (transport, files) = files();
        transport.queue_json_response(
            200,
            &json!({"entries": [{".tag": "file", "id": "id:1", "name": "a.txt"}], "cursor": "c1", "has_more": true}),
        );

        let page = files.list_folder("/", Params::new()).await.unwrap();

        assert_eq!(page.items().len(), 1);
        assert_eq!(page.cursor(), "c1");
        assert_eq!(sent_json(&transport), json!({"path": ""}));
    }

    #[tokio::test]
    async fn test_get_metadata_passes_extra_params() {
        let (transport, files) = files();
        transport.queue_json_response(200, &json!({".tag": "folder", "id": "id:2", "name": "Docs"}));

        let mut extra = Params::new();
        extra.insert("include_deleted".to_string(), json!(true));
        let model = files.get_metadata("/Docs", extra).await.unwrap();

        assert!(matches!(model, Model::Folder(_)));
        assert_eq!(sent_json(&transport), json!({"path": "/Docs", "include_deleted": true}));
    }

    #[tokio::test]
    async fn test_search_nests_options() {
        let (transport, files) = files();
        transport.queue_json_response(200, &json!({"matches": [], "has_more": false}));

        files.search("/", "report", Params::new()).await.unwrap();

        assert_eq!(
            sent_json(&transport),
            json!({"query": "report", "options": {"path": ""}})
        );
    }

    #[tokio::test]
    async fn test_delete_unwraps_metadata() {
        let (transport, files) = files();
        transport.queue_json_response(
            200,
            &json!({"metadata": {".tag": "file", "id": "id:3", "name": "old.txt"}}),
        );

        let model = files.delete("/old.txt").await.unwrap();
        assert_eq!(model.as_file().unwrap().name, "old.txt");
    }

    #[tokio::test]
    async fn test_create_folder() {
        let (transport, files) = files();
        transport.queue_json_response(
            200,
            &json!({"metadata": {"id": "id:4", "name": "New", "path_display": "/New"}}),
        );

        let folder = files.create_folder("/New", false).await.unwrap();
        assert_eq!(folder.path_display.as_deref(), Some("/New"));
        assert_eq!(sent_json(&transport), json!({"path": "/New", "autorename": false}));
    }

    #[tokio::test]
    async fn test_upload() {
        let (transport, files) = files();
        transport.queue_json_response(200, &json!({"id": "id:5", "name": "a.txt", "size": 5}));

        let metadata = files
            .upload(DropboxFile::from_bytes("a.txt", b"hello".to_vec()), "/a.txt", Params::new())
            .await
            .unwrap();

        assert_eq!(metadata.size, 5);
        let sent = transport.last_request().unwrap();
        assert_eq!(sent.url.as_str(), "https://content.dropboxapi.com/2/files/upload");
        assert_eq!(sent.body.unwrap(), Bytes::from_static(b"hello"));
    }

    #[tokio::test]
    async fn test_download_reads_result_header() {
        let (transport, files) = files();
        let mut headers = HeaderMap::new();
        headers.insert(
            "dropbox-api-result",
            HeaderValue::from_static(r#"{"id":"id:6","name":"b.txt","size":3}"#),
        );
        transport.queue_response(RawResponse::new(200, headers, Bytes::from_static(b"abc")));

        let download = files.download("/b.txt", None).await.unwrap();

        assert_eq!(download.metadata().name, "b.txt");
        assert_eq!(download.contents().await.unwrap(), Bytes::from_static(b"abc"));
        assert!(download.sink().is_none());
    }

    #[tokio::test]
    async fn test_download_without_result_header() {
        let (transport, files) = files();
        transport.queue_body(200, "application/octet-stream", "abc");

        let err = files.download("/b.txt", None).await.unwrap_err();
        assert!(matches!(err, DropboxError::Response(ResponseError::UnexpectedFormat(_))));
    }

    #[tokio::test]
    async fn test_missing_access_token() {
        let transport = Arc::new(MockTransport::new());
        let client = DropboxClient::new(transport.clone(), DropboxConfig::default());
        let files = FilesService::new(ServiceContext::new(client, None));

        let err = files.get_metadata("/a", Params::new()).await.unwrap_err();
        assert!(matches!(
            err,
            DropboxError::Authentication(AuthenticationError::MissingAccessToken)
        ));
        assert!(transport.requests().is_empty());
    }
}
