//! Upload payload sources.
//!
//! A [`DataSource`] is opened into a [`SourceReader`], which knows how many
//! bytes remain and hands them out in chunks. The upload splitter never
//! needs to know which kind of source it is reading.

use std::io::SeekFrom;
use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tracing::trace;

use crate::error::ClientError;

/// A seekable async byte stream.
pub trait AsyncReadSeek: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T: AsyncRead + AsyncSeek + Unpin + Send> AsyncReadSeek for T {}

/// Where an upload's bytes come from.
pub enum DataSource {
    /// A buffer already in memory.
    InMemory(Bytes),
    /// A seekable stream, read from its current position to the end.
    Stream(Box<dyn AsyncReadSeek>),
    /// A file on disk.
    FilePath(PathBuf),
}

impl std::fmt::Debug for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InMemory(data) => f
                .debug_struct("InMemory")
                .field("size", &data.len())
                .finish(),
            Self::Stream(_) => f.debug_struct("Stream").finish_non_exhaustive(),
            Self::FilePath(path) => f.debug_tuple("FilePath").field(path).finish(),
        }
    }
}

impl From<Bytes> for DataSource {
    fn from(data: Bytes) -> Self {
        Self::InMemory(data)
    }
}

impl From<Vec<u8>> for DataSource {
    fn from(data: Vec<u8>) -> Self {
        Self::InMemory(Bytes::from(data))
    }
}

impl From<&'static str> for DataSource {
    fn from(data: &'static str) -> Self {
        Self::InMemory(Bytes::from_static(data.as_bytes()))
    }
}

impl From<PathBuf> for DataSource {
    fn from(path: PathBuf) -> Self {
        Self::FilePath(path)
    }
}

impl DataSource {
    /// Wrap a seekable stream.
    pub fn stream(reader: impl AsyncReadSeek + 'static) -> Self {
        Self::Stream(Box::new(reader))
    }

    /// Open the source for reading and probe its size.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if a file cannot be opened or a stream
    /// cannot be seeked.
    pub async fn open(self) -> Result<SourceReader, ClientError> {
        match self {
            Self::InMemory(data) => Ok(SourceReader::Memory { data }),
            Self::Stream(reader) => SourceReader::seekable(reader).await,
            Self::FilePath(path) => {
                let file = tokio::fs::File::open(&path).await?;
                trace!(path = %path.display(), "opened file source");
                SourceReader::seekable(Box::new(file)).await
            }
        }
    }
}

/// An opened [`DataSource`].
pub enum SourceReader {
    /// Remaining in-memory bytes.
    Memory {
        /// Bytes not yet handed out.
        data: Bytes,
    },
    /// A stream and the number of bytes left in it.
    Seekable {
        /// The underlying stream.
        reader: Box<dyn AsyncReadSeek>,
        /// Bytes between the current position and the end.
        remaining: u64,
    },
}

impl std::fmt::Debug for SourceReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceReader")
            .field("size", &self.size())
            .finish()
    }
}

impl SourceReader {
    /// Measure a stream from its current position to its end, then rewind
    /// to where it was.
    async fn seekable(mut reader: Box<dyn AsyncReadSeek>) -> Result<Self, ClientError> {
        let start = reader.stream_position().await?;
        let end = reader.seek(SeekFrom::End(0)).await?;
        reader.seek(SeekFrom::Start(start)).await?;

        Ok(Self::Seekable {
            reader,
            remaining: end.saturating_sub(start),
        })
    }

    /// Bytes not yet read.
    #[must_use]
    pub fn size(&self) -> u64 {
        match self {
            Self::Memory { data } => data.len() as u64,
            Self::Seekable { remaining, .. } => *remaining,
        }
    }

    /// Read up to `max` bytes. Returns an empty buffer once the source is
    /// exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the underlying stream fails.
    pub async fn read_chunk(&mut self, max: usize) -> Result<Bytes, ClientError> {
        match self {
            Self::Memory { data } => {
                let n = max.min(data.len());
                Ok(data.split_to(n))
            }
            Self::Seekable { reader, remaining } => {
                let limit = (max as u64).min(*remaining);
                let mut buf = Vec::with_capacity(usize::try_from(limit).unwrap_or(max));
                (&mut *reader).take(limit).read_to_end(&mut buf).await?;
                *remaining -= buf.len() as u64;
                Ok(Bytes::from(buf))
            }
        }
    }

    /// Read everything that remains.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Io`] if the underlying stream fails.
    pub async fn read_all(&mut self) -> Result<Bytes, ClientError> {
        match self {
            Self::Memory { data } => Ok(std::mem::take(data)),
            Self::Seekable { reader, remaining } => {
                let mut buf = Vec::with_capacity(usize::try_from(*remaining).unwrap_or(0));
                reader.read_to_end(&mut buf).await?;
                *remaining = 0;
                Ok(Bytes::from(buf))
            }
        }
    }
}
