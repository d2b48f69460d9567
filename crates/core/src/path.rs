//! Object path parsing and wire encoding
//!
//! Store entries are addressed by absolute, slash-delimited paths such as
//! `/account/stor/backups/2026-01-01.tar`. Paths are kept in their literal
//! form client-side; [`ObjectPath::encoded`] produces the percent-encoded
//! form used on the wire, so names containing reserved characters (notably
//! spaces) round-trip unchanged.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Characters percent-encoded within a path segment.
///
/// Everything outside the RFC 3986 `segment` set: unreserved characters,
/// sub-delims, `:` and `@` stay literal; the rest (including space and `%`)
/// is encoded.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// An absolute, slash-delimited path addressing one store entry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectPath(String);

impl ObjectPath {
    /// Parse and validate a path.
    ///
    /// The path must be non-empty, start with `/`, and contain no empty
    /// segments. A single trailing slash is accepted and normalized away, so
    /// `/a/stor/dir/` and `/a/stor/dir` address the same entry.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let mut path = path.into();

        if path.is_empty() {
            return Err(Error::InvalidPath("Path cannot be empty".into()));
        }
        if !path.starts_with('/') {
            return Err(Error::InvalidPath(format!(
                "Path '{path}' must be absolute"
            )));
        }

        if path.ends_with('/') {
            path.pop();
        }
        if path.is_empty() {
            return Err(Error::InvalidPath("Path has no segments".into()));
        }

        if path[1..].split('/').any(str::is_empty) {
            return Err(Error::InvalidPath(format!(
                "Path '{path}' contains an empty segment"
            )));
        }

        Ok(Self(path))
    }

    /// The literal path string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path segment
    pub fn name(&self) -> &str {
        // Constructor guarantees at least one non-empty segment
        self.0.rsplit('/').next().unwrap_or_default()
    }

    /// The parent path (one level up), or `None` at the top level
    pub fn parent(&self) -> Option<Self> {
        let pos = self.0.rfind('/')?;
        if pos == 0 {
            None
        } else {
            Some(Self(self.0[..pos].to_string()))
        }
    }

    /// Append a child component, validating the result
    pub fn join(&self, child: &str) -> Result<Self> {
        let child = child.trim_matches('/');
        if child.is_empty() {
            return Err(Error::InvalidPath("Child segment cannot be empty".into()));
        }
        Self::new(format!("{}/{}", self.0, child))
    }

    /// Whether `other` addresses this path or a descendant of it
    pub fn contains(&self, other: &ObjectPath) -> bool {
        other.0 == self.0
            || (other.0.starts_with(&self.0) && other.0.as_bytes()[self.0.len()] == b'/')
    }

    /// The percent-encoded form sent on the wire.
    ///
    /// Each segment is encoded independently; separators stay literal.
    pub fn encoded(&self) -> String {
        let mut out = String::with_capacity(self.0.len());
        for segment in self.0[1..].split('/') {
            out.push('/');
            out.push_str(&utf8_percent_encode(segment, SEGMENT).to_string());
        }
        out
    }
}

impl std::fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ObjectPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ObjectPath {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<ObjectPath> for String {
    fn from(path: ObjectPath) -> String {
        path.0
    }
}

impl AsRef<str> for ObjectPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
