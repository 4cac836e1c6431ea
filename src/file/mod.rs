//! Local file handles used as upload sources and download sinks.

use crate::errors::{DropboxResult, FileError, TransportError};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::debug;

/// How a path-backed file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Read the file as an upload source.
    Read,
    /// Write the file as a download destination.
    Write,
}

#[derive(Clone)]
enum FileSource {
    Path(PathBuf),
    Buffer(Arc<Mutex<Vec<u8>>>),
}

/// A file to upload or a destination for a download.
///
/// Path-backed files are opened lazily. Buffer-backed files hold their bytes
/// in memory and share them between clones, so a buffer handed to a download
/// can be read back by the caller afterwards.
#[derive(Clone)]
pub struct DropboxFile {
    name: String,
    source: FileSource,
    mode: FileMode,
    offset: Option<u64>,
    max_length: Option<u64>,
}

impl DropboxFile {
    /// Creates a file backed by a local path.
    pub fn from_path(path: impl Into<PathBuf>, mode: FileMode) -> Self {
        let path = path.into();
        Self {
            name: path.to_string_lossy().into_owned(),
            source: FileSource::Path(path),
            mode,
            offset: None,
            max_length: None,
        }
    }

    /// Creates a readable file from in-memory bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            source: FileSource::Buffer(Arc::new(Mutex::new(bytes.into()))),
            mode: FileMode::Read,
            offset: None,
            max_length: None,
        }
    }

    /// Creates an empty in-memory sink for downloads.
    pub fn buffer(name: impl Into<String>) -> Self {
        Self {
            mode: FileMode::Write,
            ..Self::from_bytes(name, Vec::new())
        }
    }

    /// Starts reads at `offset` bytes into the file.
    pub fn set_offset(&mut self, offset: u64) {
        self.offset = Some(offset);
    }

    /// Limits reads to at most `max_length` bytes.
    pub fn set_max_length(&mut self, max_length: u64) {
        self.max_length = Some(max_length);
    }

    /// Open mode.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Local path, if path-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            FileSource::Path(path) => Some(path),
            FileSource::Buffer(_) => None,
        }
    }

    /// Base name of the file.
    pub fn file_name(&self) -> String {
        Path::new(&self.name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// MIME type guessed from the file name, `text/plain` when unknown.
    pub fn mime_type(&self) -> mime::Mime {
        mime_guess::from_path(&self.name).first_or(mime::TEXT_PLAIN)
    }

    /// Size of the underlying file in bytes.
    pub async fn size(&self) -> DropboxResult<u64> {
        match &self.source {
            FileSource::Path(path) => {
                let metadata = tokio::fs::metadata(path).await.map_err(|source| FileError::Io {
                    path: path.clone(),
                    source,
                })?;
                Ok(metadata.len())
            }
            FileSource::Buffer(buffer) => Ok(lock(buffer).len() as u64),
        }
    }

    /// Reads the file contents, honoring offset and max length.
    pub async fn contents(&self) -> DropboxResult<Bytes> {
        match &self.source {
            FileSource::Path(path) => self.read_path(path).await,
            FileSource::Buffer(buffer) => {
                let data = lock(buffer);
                let start = (self.offset.unwrap_or(0) as usize).min(data.len());
                let end = match self.max_length {
                    Some(max) => start.saturating_add(max as usize).min(data.len()),
                    None => data.len(),
                };
                Ok(Bytes::copy_from_slice(&data[start..end]))
            }
        }
    }

    async fn read_path(&self, path: &Path) -> DropboxResult<Bytes> {
        ensure_local(path)?;

        let mut file = tokio::fs::File::open(path)
            .await
            .map_err(|_| FileError::NotReadable(path.to_path_buf()))?;

        let io_err = |source| FileError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(offset) = self.offset {
            file.seek(std::io::SeekFrom::Start(offset))
                .await
                .map_err(io_err)?;
        }

        let mut data = Vec::new();
        match self.max_length {
            Some(max) => {
                file.take(max).read_to_end(&mut data).await.map_err(io_err)?;
            }
            None => {
                file.read_to_end(&mut data).await.map_err(io_err)?;
            }
        }

        Ok(Bytes::from(data))
    }

    /// Drains a streamed response body into this file.
    ///
    /// The sink is flushed but not otherwise managed; buffer-backed sinks stay
    /// readable through clones of this handle.
    pub async fn write_stream<S>(&self, stream: S) -> Result<u64, TransportError>
    where
        S: Stream<Item = Result<Bytes, TransportError>> + Send,
    {
        let mut stream = Box::pin(stream);
        let mut written = 0u64;

        match &self.source {
            FileSource::Path(path) => {
                ensure_local(path)?;
                let mut file = tokio::fs::File::create(path)
                    .await
                    .map_err(|_| FileError::NotWritable(path.clone()))?;

                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    file.write_all(&chunk)
                        .await
                        .map_err(|source| FileError::Io {
                            path: path.clone(),
                            source,
                        })?;
                    written += chunk.len() as u64;
                }

                file.flush().await.map_err(|source| FileError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
            FileSource::Buffer(buffer) => {
                lock(buffer).clear();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk?;
                    lock(buffer).extend_from_slice(&chunk);
                    written += chunk.len() as u64;
                }
            }
        }

        debug!(file = %self.name, bytes = written, "Wrote response body to sink");
        Ok(written)
    }
}

impl std::fmt::Debug for DropboxFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match &self.source {
            FileSource::Path(_) => "path",
            FileSource::Buffer(_) => "buffer",
        };
        f.debug_struct("DropboxFile")
            .field("name", &self.name)
            .field("source", &source)
            .field("mode", &self.mode)
            .field("offset", &self.offset)
            .field("max_length", &self.max_length)
            .finish()
    }
}

fn lock(buffer: &Mutex<Vec<u8>>) -> std::sync::MutexGuard<'_, Vec<u8>> {
    buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn ensure_local(path: &Path) -> Result<(), FileError> {
    let raw = path.to_string_lossy();
    let lower = raw.to_ascii_lowercase();
    if ["http://", "https://", "ftp://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme))
    {
        return Err(FileError::RemoteNotSupported(raw.into_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DropboxError;

    #[tokio::test]
    async fn test_buffer_window() {
        let mut file = DropboxFile::from_bytes("notes.txt", b"0123456789".to_vec());
        assert_eq!(file.contents().await.unwrap(), Bytes::from_static(b"0123456789"));

        file.set_offset(2);
        file.set_max_length(3);
        assert_eq!(file.contents().await.unwrap(), Bytes::from_static(b"234"));
    }

    #[tokio::test]
    async fn test_path_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, b"abcdefgh").unwrap();

        let mut file = DropboxFile::from_path(&path, FileMode::Read);
        assert_eq!(file.size().await.unwrap(), 8);

        file.set_offset(4);
        assert_eq!(file.contents().await.unwrap(), Bytes::from_static(b"efgh"));

        file.set_max_length(2);
        assert_eq!(file.contents().await.unwrap(), Bytes::from_static(b"ef"));
    }

    #[tokio::test]
    async fn test_unreadable_path() {
        let file = DropboxFile::from_path("/definitely/not/here.txt", FileMode::Read);
        let err = file.contents().await.unwrap_err();
        assert!(matches!(err, DropboxError::File(FileError::NotReadable(_))));
    }

    #[tokio::test]
    async fn test_remote_path_rejected() {
        let file = DropboxFile::from_path("https://example.com/a.txt", FileMode::Read);
        let err = file.contents().await.unwrap_err();
        assert!(matches!(err, DropboxError::File(FileError::RemoteNotSupported(_))));
    }

    #[tokio::test]
    async fn test_write_stream_into_buffer() {
        let sink = DropboxFile::buffer("download");
        let chunks = vec![Ok(Bytes::from_static(b"hello ")), Ok(Bytes::from_static(b"world"))];

        let written = sink.write_stream(futures::stream::iter(chunks)).await.unwrap();
        assert_eq!(written, 11);
        assert_eq!(sink.clone().contents().await.unwrap(), Bytes::from_static(b"hello world"));
    }

    #[tokio::test]
    async fn test_write_stream_into_unwritable_path() {
        let sink = DropboxFile::from_path("/definitely/not/here/out.bin", FileMode::Write);
        let chunks = vec![Ok(Bytes::from_static(b"x"))];

        let err = sink.write_stream(futures::stream::iter(chunks)).await.unwrap_err();
        assert!(matches!(err, TransportError::Sink(FileError::NotWritable(_))));
    }

    #[test]
    fn test_name_and_mime() {
        let file = DropboxFile::from_path("/tmp/photos/cat.png", FileMode::Read);
        assert_eq!(file.file_name(), "cat.png");
        assert_eq!(file.mime_type(), mime::IMAGE_PNG);

        let file = DropboxFile::from_bytes("README", Vec::new());
        assert_eq!(file.mime_type(), mime::TEXT_PLAIN);
    }
}
