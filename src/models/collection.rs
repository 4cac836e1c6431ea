//! Paginated listings and search results.

use super::{Model, ModelFactory};
use crate::errors::{DropboxResult, ResponseError};
use serde_json::{Map, Value};

/// One page of a folder listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataCollection {
    items: Vec<Model>,
    cursor: String,
    has_more: bool,
    data: Map<String, Value>,
}

impl MetadataCollection {
    /// Builds a page from a decoded response, mapping every entry through
    /// [`ModelFactory`].
    pub fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        let items = match data.get("entries") {
            Some(Value::Array(entries)) => entries
                .iter()
                .map(|entry| match entry {
                    Value::Object(entry) => ModelFactory::make(entry.clone()),
                    other => Err(ResponseError::UnexpectedFormat(format!(
                        "collection entry is not an object: {}",
                        other
                    ))
                    .into()),
                })
                .collect::<DropboxResult<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(Self {
            items,
            cursor: data
                .get("cursor")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            has_more: data.get("has_more").and_then(Value::as_bool).unwrap_or(false),
            data,
        })
    }

    /// Entries on this page.
    pub fn items(&self) -> &[Model] {
        &self.items
    }

    /// Consumes the page, returning its entries.
    pub fn into_items(self) -> Vec<Model> {
        self.items
    }

    /// Cursor for the next page; empty when none was returned.
    pub fn cursor(&self) -> &str {
        &self.cursor
    }

    /// Whether another page is available.
    pub fn has_more_items(&self) -> bool {
        self.has_more
    }

    /// The decoded response.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// A single search match.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    match_type: Option<String>,
    metadata: Option<Model>,
    data: Map<String, Value>,
}

impl SearchResult {
    /// Builds a match from one entry of `matches`.
    ///
    /// Metadata wrapped as `{".tag": "metadata", "metadata": {...}}` is
    /// unwrapped before it goes through [`ModelFactory`].
    pub fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        let match_type = data
            .get("match_type")
            .and_then(|t| t.get(".tag"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let metadata = match data.get("metadata") {
            Some(Value::Object(metadata)) => {
                let inner = match (metadata.get(".tag"), metadata.get("metadata")) {
                    (Some(Value::String(tag)), Some(Value::Object(inner))) if tag == "metadata" => {
                        inner.clone()
                    }
                    _ => metadata.clone(),
                };
                Some(ModelFactory::make(inner)?)
            }
            _ => None,
        };

        Ok(Self {
            match_type,
            metadata,
            data,
        })
    }

    /// How the entry matched, such as `filename` or `content`.
    pub fn match_type(&self) -> Option<&str> {
        self.match_type.as_deref()
    }

    /// Metadata of the matched entry.
    pub fn metadata(&self) -> Option<&Model> {
        self.metadata.as_ref()
    }

    /// The decoded match.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}

/// One page of search matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    items: Vec<SearchResult>,
    has_more: bool,
    cursor: Option<String>,
    start: Option<u64>,
    data: Map<String, Value>,
}

impl SearchResults {
    /// Builds a page from a decoded response.
    ///
    /// Accepts both `has_more`/`cursor` and the older `more`/`start` keys.
    pub fn from_data(data: Map<String, Value>) -> DropboxResult<Self> {
        let items = match data.get("matches") {
            Some(Value::Array(matches)) => matches
                .iter()
                .map(|entry| match entry {
                    Value::Object(entry) => SearchResult::from_data(entry.clone()),
                    other => Err(ResponseError::UnexpectedFormat(format!(
                        "search match is not an object: {}",
                        other
                    ))
                    .into()),
                })
                .collect::<DropboxResult<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let has_more = data
            .get("has_more")
            .or_else(|| data.get("more"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(Self {
            items,
            has_more,
            cursor: data.get("cursor").and_then(Value::as_str).map(str::to_string),
            start: data.get("start").and_then(Value::as_u64),
            data,
        })
    }

    /// Matches on this page.
    pub fn items(&self) -> &[SearchResult] {
        &self.items
    }

    /// Whether more matches are available.
    pub fn has_more_items(&self) -> bool {
        self.has_more
    }

    /// Cursor for the next page.
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Offset of the next page in the older paging scheme.
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// The decoded response.
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }
}
