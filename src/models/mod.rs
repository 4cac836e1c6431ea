//! Typed models for decoded API responses.
//!
//! [`ModelFactory::make`] inspects the shape of a decoded JSON object and
//! picks the matching [`Model`] variant:
//!
//! 1. `.tag` and `id` present: file or folder metadata, by tag.
//! 2. `metadata` and `link` present: [`TemporaryLink`].
//! 3. `entries` present: [`MetadataCollection`].
//! 4. `matches` present: [`SearchResults`].
//! 5. `.tag` or `id` missing: [`DeletedMetadata`].
//! 6. Anything else: [`BaseModel`].
//!
//! Rule 5 also catches shapes that are not deleted entries, such as `{}`.

mod account;
mod collection;
mod link;
mod metadata;
mod token;

pub use account::{Account, Name, Tagged};
pub use collection::{MetadataCollection, SearchResult, SearchResults};
pub use link::{CopyReference, TemporaryLink};
pub use metadata::{
    DeletedMetadata, Dimensions, FileMetadata, FolderMetadata, GpsCoordinates, MediaInfo,
    MediaMetadata, PhotoMetadata, VideoMetadata,
};
pub use token::AccessToken;

use crate::errors::{DropboxError, DropboxResult};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Conversion between serde-backed models and their JSON mapping.
pub trait JsonModel: Sized {
    /// Builds the model from a decoded JSON object.
    fn from_data(data: Map<String, Value>) -> DropboxResult<Self>;

    /// The model as a JSON object, unknown fields included.
    fn data(&self) -> Map<String, Value>;
}

impl<T: Serialize + DeserializeOwned> JsonModel for T {
    fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        serde_json::from_value(Value::Object(data))
            .map_err(|e| DropboxError::deserialization(e.to_string()))
    }

    fn data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Untyped fallback model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseModel {
    data: Map<String, Value>,
}

impl BaseModel {
    /// Wraps a decoded JSON object.
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Value of a single field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// A decoded response, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// File metadata.
    File(FileMetadata),
    /// Folder metadata.
    Folder(FolderMetadata),
    /// Temporary download link.
    TemporaryLink(TemporaryLink),
    /// Folder listing page.
    Collection(MetadataCollection),
    /// Search results page.
    SearchResults(SearchResults),
    /// Deleted entry, or a payload without `.tag`/`id`.
    Deleted(DeletedMetadata),
    /// Anything else.
    Generic(BaseModel),
}

impl Model {
    /// The model as a JSON object.
    pub fn data(&self) -> Map<String, Value> {
        match self {
            Model::File(file) => file.data(),
            Model::Folder(folder) => folder.data(),
            Model::TemporaryLink(link) => link.data(),
            Model::Collection(collection) => collection.data().clone(),
            Model::SearchResults(results) => results.data().clone(),
            Model::Deleted(deleted) => deleted.data(),
            Model::Generic(base) => base.data(),
        }
    }

    /// File metadata, if this is a file.
    pub fn as_file(&self) -> Option<&FileMetadata> {
        match self {
            Model::File(file) => Some(file),
            _ => None,
        }
    }

    /// Folder metadata, if this is a folder.
    pub fn as_folder(&self) -> Option<&FolderMetadata> {
        match self {
            Model::Folder(folder) => Some(folder),
            _ => None,
        }
    }

    /// Display path of a file, folder or deleted entry.
    pub fn path_display(&self) -> Option<&str> {
        match self {
            Model::File(file) => file.path_display.as_deref(),
            Model::Folder(folder) => folder.path_display.as_deref(),
            Model::Deleted(deleted) => deleted.path_display.as_deref(),
            _ => None,
        }
    }
}

/// Maps decoded JSON objects onto [`Model`] variants.
pub struct ModelFactory;

impl ModelFactory {
    /// Classifies `data` and builds the matching model.
    pub fn make(data: Map<String, Value>) -> DropboxResult<Model> {
        if has(&data, ".tag") && has(&data, "id") {
            let tag = data
                .get(".tag")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            match tag.as_str() {
                "file" => return FileMetadata::from_data(data).map(Model::File),
                "folder" => return FolderMetadata::from_data(data).map(Model::Folder),
                _ => {}
            }
        }

        if has(&data, "metadata") && has(&data, "link") {
            return TemporaryLink::from_data(data).map(Model::TemporaryLink);
        }

        if has(&data, "entries") {
            return MetadataCollection::from_data(data).map(Model::Collection);
        }

        if has(&data, "matches") {
            return SearchResults::from_data(data).map(Model::SearchResults);
        }

        if !has(&data, ".tag") || !has(&data, "id") {
            return DeletedMetadata::from_data(data).map(Model::Deleted);
        }

        Ok(Model::Generic(BaseModel::new(data)))
    }
}

fn has(data: &Map<String, Value>, key: &str) -> bool {
    data.get(key).map_or(false, |v| !v.is_null())
}
