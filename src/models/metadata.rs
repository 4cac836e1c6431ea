//! File, folder and deleted-entry metadata.

use chrono::{DateTime, Utc};
use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

const TAG: &str = ".tag";

/// Metadata of a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    /// Unique identifier (`id:...`).
    pub id: String,
    /// Last path component.
    #[serde(default)]
    pub name: String,
    /// Lowercased full path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    /// Cased full path for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    /// Revision identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Modification time reported by the client that wrote the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_modified: Option<DateTime<Utc>>,
    /// Last modification time on the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<DateTime<Utc>>,
    /// Dropbox content hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    /// Whether the file can be downloaded directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_downloadable: Option<bool>,
    /// Photo or video details, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_info: Option<MediaInfo>,
    /// Fields without a typed counterpart, including `.tag`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FileMetadata {
    /// Photo or video details, if already available.
    pub fn media_metadata(&self) -> Option<&MediaMetadata> {
        match &self.media_info {
            Some(MediaInfo::Metadata { metadata }) => Some(metadata),
            _ => None,
        }
    }
}

/// Metadata of a folder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderMetadata {
    /// Unique identifier (`id:...`).
    pub id: String,
    /// Last path component.
    #[serde(default)]
    pub name: String,
    /// Lowercased full path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    /// Cased full path for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marker for a deleted file or folder.
///
/// Also produced for any payload that lacks either `.tag` or `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeletedMetadata {
    /// Last path component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lowercased full path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_lower: Option<String>,
    /// Cased full path for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Media information attached to a file.
///
/// Tags this crate does not know keep their raw fields, so they survive a
/// round trip through `data()`.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaInfo {
    /// Still being extracted by the server.
    Pending,
    /// Extracted metadata.
    Metadata {
        /// Photo or video details.
        metadata: MediaMetadata,
    },
    /// An unrecognised tag, with all of its fields.
    Unknown(Map<String, Value>),
}

/// Photo or video details.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaMetadata {
    /// Photo.
    Photo(PhotoMetadata),
    /// Video.
    Video(VideoMetadata),
    /// An unrecognised tag, with all of its fields.
    Unknown(Map<String, Value>),
}

impl<'de> Deserialize<'de> for MediaInfo {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Map::<String, Value>::deserialize(deserializer)?;
        match tag_of(&raw).as_deref() {
            Some("pending") => Ok(MediaInfo::Pending),
            Some("metadata") => {
                let metadata = raw.remove("metadata").unwrap_or(Value::Null);
                MediaMetadata::deserialize(metadata)
                    .map(|metadata| MediaInfo::Metadata { metadata })
                    .map_err(de::Error::custom)
            }
            _ => Ok(MediaInfo::Unknown(raw)),
        }
    }
}

impl Serialize for MediaInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MediaInfo::Pending => tagged("pending", Map::new()).serialize(serializer),
            MediaInfo::Metadata { metadata } => {
                let mut fields = Map::new();
                fields.insert(
                    "metadata".to_string(),
                    serde_json::to_value(metadata).map_err(ser::Error::custom)?,
                );
                tagged("metadata", fields).serialize(serializer)
            }
            MediaInfo::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MediaMetadata {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Map::<String, Value>::deserialize(deserializer)?;
        match tag_of(&raw).as_deref() {
            Some("photo") => {
                raw.remove(TAG);
                PhotoMetadata::deserialize(Value::Object(raw))
                    .map(MediaMetadata::Photo)
                    .map_err(de::Error::custom)
            }
            Some("video") => {
                raw.remove(TAG);
                VideoMetadata::deserialize(Value::Object(raw))
                    .map(MediaMetadata::Video)
                    .map_err(de::Error::custom)
            }
            _ => Ok(MediaMetadata::Unknown(raw)),
        }
    }
}

impl Serialize for MediaMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MediaMetadata::Photo(photo) => tagged("photo", object(photo)?).serialize(serializer),
            MediaMetadata::Video(video) => tagged("video", object(video)?).serialize(serializer),
            MediaMetadata::Unknown(raw) => raw.serialize(serializer),
        }
    }
}

fn tag_of(raw: &Map<String, Value>) -> Option<String> {
    raw.get(TAG).and_then(Value::as_str).map(str::to_owned)
}

fn tagged(tag: &str, mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.insert(TAG.to_string(), Value::String(tag.to_string()));
    fields
}

fn object<T: Serialize, E: ser::Error>(value: &T) -> Result<Map<String, Value>, E> {
    match serde_json::to_value(value).map_err(E::custom)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Map::new()),
    }
}

impl MediaMetadata {
    /// Pixel dimensions.
    pub fn dimensions(&self) -> Option<&Dimensions> {
        match self {
            MediaMetadata::Photo(photo) => photo.dimensions.as_ref(),
            MediaMetadata::Video(video) => video.dimensions.as_ref(),
            MediaMetadata::Unknown(_) => None,
        }
    }

    /// Where the media was captured.
    pub fn location(&self) -> Option<&GpsCoordinates> {
        match self {
            MediaMetadata::Photo(photo) => photo.location.as_ref(),
            MediaMetadata::Video(video) => video.location.as_ref(),
            MediaMetadata::Unknown(_) => None,
        }
    }

    /// When the media was captured.
    pub fn time_taken(&self) -> Option<DateTime<Utc>> {
        match self {
            MediaMetadata::Photo(photo) => photo.time_taken,
            MediaMetadata::Video(video) => video.time_taken,
            MediaMetadata::Unknown(_) => None,
        }
    }
}

/// Photo details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhotoMetadata {
    /// Pixel dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Capture location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GpsCoordinates>,
    /// Capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<DateTime<Utc>>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Video details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Pixel dimensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    /// Capture location.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GpsCoordinates>,
    /// Capture time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_taken: Option<DateTime<Utc>>,
    /// Duration in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Fields without a typed counterpart.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Height.
    pub height: u64,
    /// Width.
    pub width: u64,
}

/// GPS position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JsonModel;
    use serde_json::json;

    #[test]
    fn test_file_metadata_with_video() {
        let file: FileMetadata = serde_json::from_value(json!({
            ".tag": "file",
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "name": "clip.mp4",
            "path_lower": "/media/clip.mp4",
            "size": 7212,
            "server_modified": "2015-05-12T15:50:38Z",
            "media_info": {
                ".tag": "metadata",
                "metadata": {
                    ".tag": "video",
                    "dimensions": {"height": 1080, "width": 1920},
                    "location": {"latitude": 10.12, "longitude": -20.5},
                    "time_taken": "2015-05-12T15:50:38Z",
                    "duration": 1200
                }
            },
            "sharing_info": {"read_only": true}
        }))
        .unwrap();

        assert_eq!(file.size, 7212);
        assert_eq!(file.extra.get(".tag"), Some(&json!("file")));
        assert!(file.extra.contains_key("sharing_info"));

        let media = file.media_metadata().unwrap();
        assert_eq!(media.dimensions(), Some(&Dimensions { height: 1080, width: 1920 }));
        assert_eq!(media.location().unwrap().longitude, -20.5);
        assert!(media.time_taken().is_some());
        match media {
            MediaMetadata::Video(video) => assert_eq!(video.duration, Some(1200)),
            other => panic!("expected video, got {:?}", other),
        }
    }

    #[test]
    fn test_pending_and_unknown_media_info() {
        let pending: MediaInfo = serde_json::from_value(json!({".tag": "pending"})).unwrap();
        assert_eq!(pending, MediaInfo::Pending);

        let unknown: MediaMetadata =
            serde_json::from_value(json!({".tag": "hologram"})).unwrap();
        assert!(matches!(unknown, MediaMetadata::Unknown(_)));
        assert_eq!(unknown.dimensions(), None);
    }

    #[test]
    fn test_unknown_media_survives_data() {
        let raw = json!({
            ".tag": "file",
            "id": "id:h1",
            "name": "scan.holo",
            "size": 42,
            "media_info": {
                ".tag": "metadata",
                "metadata": {".tag": "hologram", "depth": 3, "layers": ["a", "b"]}
            }
        });
        let file = FileMetadata::from_data(raw.as_object().cloned().unwrap()).unwrap();
        assert_eq!(Value::Object(file.data()), raw);

        let raw = json!({".tag": "processing", "eta_seconds": 30});
        let info: MediaInfo = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_known_media_keeps_extra_fields() {
        let raw = json!({
            ".tag": "metadata",
            "metadata": {
                ".tag": "photo",
                "dimensions": {"height": 600, "width": 800},
                "lens": "35mm"
            }
        });
        let info: MediaInfo = serde_json::from_value(raw.clone()).unwrap();

        match &info {
            MediaInfo::Metadata { metadata: MediaMetadata::Photo(photo) } => {
                assert_eq!(photo.extra.get("lens"), Some(&json!("35mm")));
                assert!(!photo.extra.contains_key(".tag"));
            }
            other => panic!("expected photo, got {:?}", other),
        }
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }

    #[test]
    fn test_deleted_metadata_is_lenient() {
        let deleted: DeletedMetadata = serde_json::from_value(json!({})).unwrap();
        assert_eq!(deleted, DeletedMetadata::default());
    }
}
