//! ObjectStore trait definition
//!
//! This trait defines the interface for path-addressed object store
//! operations. It decouples callers from the HTTP implementation so the
//! contract can be exercised against the in-memory store in tests.

use async_trait::async_trait;

use crate::error::Result;
use crate::headers::ObjectHeaders;
use crate::object::{Object, ObjectData, StoredObject};
use crate::path::ObjectPath;

/// Options for object writes
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    /// Requested replication factor; `None` means the store default
    pub durability_level: Option<u64>,

    /// Content type recorded for the object; `None` means the store default
    pub content_type: Option<String>,

    /// Additional metadata headers, passed through verbatim
    pub headers: ObjectHeaders,
}

impl PutOptions {
    /// Options with the given durability level
    pub fn durability(level: u64) -> Self {
        Self {
            durability_level: Some(level),
            ..Self::default()
        }
    }

    /// Merge the typed fields and the pass-through bag into the headers sent
    /// with the write, validating recognized keys at the boundary.
    pub fn effective_headers(&self) -> Result<ObjectHeaders> {
        let mut headers = self.headers.clone();
        if let Some(content_type) = &self.content_type {
            headers.insert(crate::headers::CONTENT_TYPE, content_type.clone());
        }
        if let Some(level) = self.durability_level {
            headers.set_durability_level(level);
        }
        headers.durability_level()?;
        Ok(headers)
    }
}

/// Options for directory creation
#[derive(Debug, Clone, Default)]
pub struct DirectoryOptions {
    /// Additional metadata headers, passed through verbatim
    pub headers: ObjectHeaders,
}

/// Options for snaplink creation
#[derive(Debug, Clone, Default)]
pub struct LinkOptions {
    /// Additional metadata headers, passed through verbatim
    pub headers: ObjectHeaders,
}

/// Trait for path-addressed object store operations.
///
/// Every call is an independent request/response exchange with no shared
/// mutable client state, so a store handle can be shared freely across tasks.
/// Concurrent writes to the same path are resolved by the remote store, not
/// arbitrated here.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write an object at `path`, creating or overwriting.
    ///
    /// Metadata from `options` is recorded with the object and returned
    /// verbatim on subsequent reads.
    async fn put(&self, path: &ObjectPath, data: ObjectData, options: PutOptions) -> Result<()>;

    /// Fetch the object at `path` as a descriptor plus streaming content.
    ///
    /// Fails with a not-found error when the path is absent. The body is a
    /// scoped resource; consume or drop it to release the connection.
    async fn get(&self, path: &ObjectPath) -> Result<Object>;

    /// Fetch only the metadata descriptor for `path`, without the content.
    async fn head(&self, path: &ObjectPath) -> Result<StoredObject>;

    /// Remove the single entry at `path`.
    ///
    /// Fails with a not-found error when the path is absent. Deleting a
    /// non-empty directory fails; use [`delete_recursive`].
    ///
    /// [`delete_recursive`]: ObjectStore::delete_recursive
    async fn delete(&self, path: &ObjectPath) -> Result<()>;

    /// Remove `path` and, if it is a directory, all descendants.
    ///
    /// Descendants are deleted depth-first, one call per entry; the operation
    /// is not atomic. A failure partway leaves the already-deleted
    /// descendants gone, and a repeated call resumes where the previous one
    /// stopped.
    async fn delete_recursive(&self, path: &ObjectPath) -> Result<()>;

    /// Create a directory marker at `path`.
    ///
    /// Creating a directory that already exists succeeds without error.
    async fn put_directory(&self, path: &ObjectPath, options: DirectoryOptions) -> Result<()>;

    /// Create a snaplink at `link_path` referencing `target_path`.
    ///
    /// The link serves the content `target_path` held at creation time;
    /// later writes to the target do not affect it. Fails with a not-found
    /// error when the target does not exist.
    async fn put_snap_link(
        &self,
        link_path: &ObjectPath,
        target_path: &ObjectPath,
        options: LinkOptions,
    ) -> Result<()>;

    /// List the immediate children of the directory at `path`.
    ///
    /// Child paths are prefixed by `path`; descendants below the first level
    /// are not included. Fails with an object-type error when `path`
    /// addresses a plain object.
    async fn list_objects(&self, path: &ObjectPath) -> Result<Vec<StoredObject>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_options_default() {
        let options = PutOptions::default();
        assert_eq!(options.durability_level, None);
        assert_eq!(options.content_type, None);
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_put_options_durability() {
        let options = PutOptions::durability(6);
        assert_eq!(options.durability_level, Some(6));
        assert_eq!(options.content_type, None);
    }

    #[test]
    fn test_effective_headers_merges_typed_fields() {
        let mut options = PutOptions::durability(3);
        options.content_type = Some("text/plain".into());
        options.headers.insert("x-custom", "v");

        let headers = options.effective_headers().unwrap();
        assert_eq!(headers.durability_level().unwrap(), Some(3));
        assert_eq!(headers.content_type(), Some("text/plain"));
        assert_eq!(headers.get("x-custom"), Some("v"));
    }

    #[test]
    fn test_effective_headers_rejects_zero_durability() {
        let options = PutOptions::durability(0);
        assert!(options.effective_headers().is_err());
    }

    #[test]
    fn test_effective_headers_validates_pass_through_durability() {
        let mut options = PutOptions::default();
        options.headers.insert("durability-level", "lots");
        assert!(options.effective_headers().is_err());
    }
}
