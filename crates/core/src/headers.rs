//! Object metadata headers
//!
//! Store-specific metadata travels as string-keyed headers on every write and
//! read. The bag passes unknown keys through verbatim and offers typed
//! accessors for the recognized ones, validating them at the boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Header carrying the requested replication factor for an object
pub const DURABILITY_LEVEL: &str = "durability-level";

/// Content type header
pub const CONTENT_TYPE: &str = "content-type";

/// Content length header
pub const CONTENT_LENGTH: &str = "content-length";

/// Entity tag header
pub const ETAG: &str = "etag";

/// Last modification time header
pub const LAST_MODIFIED: &str = "last-modified";

/// String-keyed metadata attached to a stored object.
///
/// Keys are normalized to lowercase on insertion, matching HTTP header
/// semantics; insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectHeaders {
    #[serde(flatten)]
    map: BTreeMap<String, String>,
}

impl ObjectHeaders {
    /// Create an empty header bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a header, replacing any previous value for the same name
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.map.insert(name.as_ref().to_lowercase(), value.into());
    }

    /// Look up a header by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.map.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Remove a header, returning its previous value
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.map.remove(&name.to_lowercase())
    }

    /// Number of headers in the bag
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over all name/value pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The requested durability level, validated as a positive integer
    pub fn durability_level(&self) -> Result<Option<u64>> {
        match self.get(DURABILITY_LEVEL) {
            None => Ok(None),
            Some(raw) => match raw.parse::<u64>() {
                Ok(n) if n > 0 => Ok(Some(n)),
                _ => Err(Error::InvalidHeader(format!(
                    "{DURABILITY_LEVEL} must be a positive integer, got '{raw}'"
                ))),
            },
        }
    }

    /// Set the requested durability level
    pub fn set_durability_level(&mut self, level: u64) {
        self.insert(DURABILITY_LEVEL, level.to_string());
    }

    /// The content type, if present
    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE)
    }

    /// The content length in bytes, if present and well-formed
    pub fn content_length(&self) -> Result<Option<u64>> {
        match self.get(CONTENT_LENGTH) {
            None => Ok(None),
            Some(raw) => raw.parse::<u64>().map(Some).map_err(|_| {
                Error::InvalidHeader(format!("{CONTENT_LENGTH} must be an integer, got '{raw}'"))
            }),
        }
    }

    /// The entity tag, if present
    pub fn etag(&self) -> Option<&str> {
        self.get(ETAG)
    }

    /// The last modification time, if present
    pub fn last_modified(&self) -> Option<&str> {
        self.get(LAST_MODIFIED)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ObjectHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}
