//! Object descriptors and payloads
//!
//! A path denotes exactly one of an object or a directory at any time.
//! [`StoredObject`] is the metadata descriptor returned by `head`, carried in
//! `get` responses, and produced by directory listings. [`ObjectBody`] is the
//! streaming read side; [`ObjectData`] the write side.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{Error, Result};
use crate::headers::{self, ObjectHeaders};
use crate::path::ObjectPath;

/// Content type marking a directory on create and on `head`/`get` responses
pub const DIRECTORY_CONTENT_TYPE: &str = "application/json; type=directory";

/// Content type marking a snaplink create request
pub const LINK_CONTENT_TYPE: &str = "application/json; type=link";

/// Content type of a directory listing stream
pub const DIRECTORY_STREAM_CONTENT_TYPE: &str = "application/x-json-stream; type=directory";

/// Whether a response content type denotes a directory
pub fn is_directory_content_type(content_type: &str) -> bool {
    content_type.contains("type=directory")
}

/// The kind of entry a path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A plain object with content
    Object,
    /// A directory containing zero or more children
    Directory,
}

impl ObjectKind {
    /// Whether this is [`ObjectKind::Directory`]
    pub const fn is_directory(self) -> bool {
        matches!(self, ObjectKind::Directory)
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Object => write!(f, "object"),
            ObjectKind::Directory => write!(f, "directory"),
        }
    }
}

/// Metadata descriptor for a named store entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    /// Absolute path addressing the entry
    pub path: ObjectPath,

    /// Whether the entry is an object or a directory
    pub kind: ObjectKind,

    /// Store metadata, passed through verbatim
    #[serde(default)]
    pub headers: ObjectHeaders,
}

impl StoredObject {
    /// Create a descriptor
    pub fn new(path: ObjectPath, kind: ObjectKind, headers: ObjectHeaders) -> Self {
        Self {
            path,
            kind,
            headers,
        }
    }

    /// Create a plain-object descriptor with no metadata
    pub fn object(path: ObjectPath) -> Self {
        Self::new(path, ObjectKind::Object, ObjectHeaders::new())
    }

    /// Create a directory descriptor with no metadata
    pub fn directory(path: ObjectPath) -> Self {
        Self::new(path, ObjectKind::Directory, ObjectHeaders::new())
    }

    /// Whether the entry is a directory
    pub const fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// The durability level from the metadata, validated
    pub fn durability_level(&self) -> Result<Option<u64>> {
        self.headers.durability_level()
    }

    /// The content type from the metadata
    pub fn content_type(&self) -> Option<&str> {
        self.headers.content_type()
    }

    /// The content length from the metadata, validated
    pub fn content_length(&self) -> Result<Option<u64>> {
        self.headers.content_length()
    }

    /// The entity tag from the metadata
    pub fn etag(&self) -> Option<&str> {
        self.headers.etag()
    }
}

/// One line of a directory listing stream, as sent by the store
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    /// Entry name relative to the listed directory
    pub name: String,

    /// Entry kind
    #[serde(rename = "type")]
    pub kind: ObjectKind,

    /// Object size in bytes (absent for directories)
    #[serde(default)]
    pub size: Option<u64>,

    /// Entity tag (absent for directories)
    #[serde(default)]
    pub etag: Option<String>,

    /// Last modification time
    #[serde(default)]
    pub mtime: Option<jiff::Timestamp>,

    /// Replicas stored for the object
    #[serde(default)]
    pub durability: Option<u64>,
}

impl DirectoryEntry {
    /// Resolve this entry into a descriptor under the listed directory path
    pub fn into_object(self, parent: &ObjectPath) -> Result<StoredObject> {
        let path = parent.join(&self.name)?;
        let mut hdrs = ObjectHeaders::new();
        if let Some(size) = self.size {
            hdrs.insert(headers::CONTENT_LENGTH, size.to_string());
        }
        if let Some(etag) = self.etag {
            hdrs.insert(headers::ETAG, etag);
        }
        if let Some(mtime) = self.mtime {
            hdrs.insert(headers::LAST_MODIFIED, mtime.to_string());
        }
        if let Some(durability) = self.durability {
            hdrs.set_durability_level(durability);
        }
        Ok(StoredObject::new(path, self.kind, hdrs))
    }
}

/// Streaming content of a fetched object.
///
/// The stream is a scoped resource: consume it fully with [`bytes`],
/// [`text`], or [`write_to`], or drop it to release the underlying
/// connection.
///
/// [`bytes`]: ObjectBody::bytes
/// [`text`]: ObjectBody::text
/// [`write_to`]: ObjectBody::write_to
pub struct ObjectBody {
    inner: Pin<Box<dyn Stream<Item = Result<Bytes>> + Send + 'static>>,
}

impl ObjectBody {
    /// Wrap a stream of byte chunks
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A body over a single in-memory chunk
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::from_stream(futures::stream::iter(std::iter::once(Ok(data))))
    }

    /// An empty body
    pub fn empty() -> Self {
        Self::from_stream(futures::stream::empty())
    }

    /// Materialize the full content in memory
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.inner.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Materialize the full content as a UTF-8 string
    pub async fn text(self) -> Result<String> {
        let bytes = self.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| Error::Encoding(format!("Object content is not valid UTF-8: {e}")))
    }

    /// Stream the content into a writer, returning the number of bytes written
    pub async fn write_to<W>(mut self, writer: &mut W) -> Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        let mut written = 0u64;
        while let Some(chunk) = self.inner.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        writer.flush().await?;
        Ok(written)
    }
}

impl Stream for ObjectBody {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ObjectBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectBody").finish_non_exhaustive()
    }
}

/// A fetched object: descriptor plus streaming content
#[derive(Debug)]
pub struct Object {
    /// Metadata descriptor
    pub info: StoredObject,

    /// Streaming content
    pub body: ObjectBody,
}

impl Object {
    /// The object's path
    pub fn path(&self) -> &ObjectPath {
        &self.info.path
    }

    /// The object's metadata headers
    pub fn headers(&self) -> &ObjectHeaders {
        &self.info.headers
    }

    /// Split into descriptor and body
    pub fn into_parts(self) -> (StoredObject, ObjectBody) {
        (self.info, self.body)
    }
}

/// Payload for a write: in-memory bytes or a streaming source
#[derive(Debug)]
pub enum ObjectData {
    /// Fully buffered payload
    Bytes(Bytes),
    /// Streaming payload of unknown length
    Stream(ObjectBody),
}

impl ObjectData {
    /// A streaming payload
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        ObjectData::Stream(ObjectBody::from_stream(stream))
    }

    /// Payload length, when known up front
    pub fn len(&self) -> Option<u64> {
        match self {
            ObjectData::Bytes(b) => Some(b.len() as u64),
            ObjectData::Stream(_) => None,
        }
    }

    /// Whether the payload is known to be empty
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Materialize the payload in memory
    pub async fn into_bytes(self) -> Result<Bytes> {
        match self {
            ObjectData::Bytes(b) => Ok(b),
            ObjectData::Stream(s) => s.bytes().await,
        }
    }
}

impl From<Bytes> for ObjectData {
    fn from(data: Bytes) -> Self {
        ObjectData::Bytes(data)
    }
}

impl From<Vec<u8>> for ObjectData {
    fn from(data: Vec<u8>) -> Self {
        ObjectData::Bytes(data.into())
    }
}

impl From<String> for ObjectData {
    fn from(data: String) -> Self {
        ObjectData::Bytes(data.into())
    }
}

impl From<&str> for ObjectData {
    fn from(data: &str) -> Self {
        ObjectData::Bytes(Bytes::copy_from_slice(data.as_bytes()))
    }
}
