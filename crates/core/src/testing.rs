//! In-memory reference store
//!
//! A complete [`ObjectStore`] implementation over a sorted map, used as a
//! test double for exercising the trait contract without a live endpoint.
//! Differences from a real store: parent directories are not enforced on
//! writes, and recursive deletes happen under one lock rather than one
//! request per entry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::Mutex;

use crate::error::{Error, Result};
use crate::headers::{self, ObjectHeaders};
use crate::object::{Object, ObjectBody, ObjectData, ObjectKind, StoredObject};
use crate::path::ObjectPath;
use crate::store::{DirectoryOptions, LinkOptions, ObjectStore, PutOptions};

#[derive(Debug, Clone)]
struct MemEntry {
    kind: ObjectKind,
    headers: ObjectHeaders,
    data: Bytes,
}

impl MemEntry {
    fn descriptor(&self, path: ObjectPath) -> StoredObject {
        StoredObject::new(path, self.kind, self.headers.clone())
    }
}

/// In-memory [`ObjectStore`] backed by a sorted map
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    entries: Mutex<BTreeMap<String, MemEntry>>,
}

impl InMemoryObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an entry exists at `path`
    pub async fn contains(&self, path: &ObjectPath) -> bool {
        self.entries.lock().await.contains_key(path.as_str())
    }

    /// Number of entries in the store
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Whether the store has no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, path: &ObjectPath, data: ObjectData, options: PutOptions) -> Result<()> {
        let mut hdrs = options.effective_headers()?;
        let data = data.into_bytes().await?;
        hdrs.insert(headers::CONTENT_LENGTH, data.len().to_string());
        if hdrs.content_type().is_none() {
            hdrs.insert(headers::CONTENT_TYPE, "application/octet-stream");
        }

        let mut entries = self.entries.lock().await;
        if let Some(existing) = entries.get(path.as_str())
            && existing.kind.is_directory()
        {
            return Err(Error::ObjectType(format!(
                "{path} is a directory, cannot overwrite with an object"
            )));
        }
        entries.insert(
            path.as_str().to_string(),
            MemEntry {
                kind: ObjectKind::Object,
                headers: hdrs,
                data,
            },
        );
        Ok(())
    }

    async fn get(&self, path: &ObjectPath) -> Result<Object> {
        let entries = self.entries.lock().await;
        let entry = entries
            .get(path.as_str())
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        Ok(Object {
            info: entry.descriptor(path.clone()),
            body: ObjectBody::from_bytes(entry.data.clone()),
        })
    }

    async fn head(&self, path: &ObjectPath) -> Result<StoredObject> {
        let entries = self.entries.lock().await;
        let entry = entries
            .get(path.as_str())
            .ok_or_else(|| Error::NotFound(path.to_string()))?;
        Ok(entry.descriptor(path.clone()))
    }

    async fn delete(&self, path: &ObjectPath) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let entry = entries
            .get(path.as_str())
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        if entry.kind.is_directory() {
            let prefix = format!("{}/", path.as_str());
            if entries.keys().any(|k| k.starts_with(&prefix)) {
                return Err(Error::RequestFailed {
                    status: 400,
                    body: format!("Directory not empty: {path}"),
                });
            }
        }

        entries.remove(path.as_str());
        Ok(())
    }

    async fn delete_recursive(&self, path: &ObjectPath) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if !entries.contains_key(path.as_str()) {
            return Err(Error::NotFound(path.to_string()));
        }
        let prefix = format!("{}/", path.as_str());
        entries.retain(|k, _| k != path.as_str() && !k.starts_with(&prefix));
        Ok(())
    }

    async fn put_directory(&self, path: &ObjectPath, options: DirectoryOptions) -> Result<()> {
        let mut entries = self.entries.lock().await;
        if let Some(existing) = entries.get(path.as_str()) {
            return if existing.kind.is_directory() {
                // Re-creating an existing directory is idempotent
                Ok(())
            } else {
                Err(Error::ObjectType(format!(
                    "{path} is an object, cannot create a directory over it"
                )))
            };
        }

        let mut hdrs = options.headers;
        hdrs.insert(headers::CONTENT_TYPE, crate::object::DIRECTORY_CONTENT_TYPE);
        entries.insert(
            path.as_str().to_string(),
            MemEntry {
                kind: ObjectKind::Directory,
                headers: hdrs,
                data: Bytes::new(),
            },
        );
        Ok(())
    }

    async fn put_snap_link(
        &self,
        link_path: &ObjectPath,
        target_path: &ObjectPath,
        options: LinkOptions,
    ) -> Result<()> {
        let mut entries = self.entries.lock().await;
        let target = entries
            .get(target_path.as_str())
            .ok_or_else(|| Error::NotFound(target_path.to_string()))?;

        if target.kind.is_directory() {
            return Err(Error::ObjectType(format!(
                "{target_path} is a directory, snaplinks reference objects"
            )));
        }

        // Snapshot semantics: the link captures the target's content and
        // metadata as of creation time
        let mut snapshot = target.clone();
        for (name, value) in options.headers.iter() {
            snapshot.headers.insert(name, value);
        }
        entries.insert(link_path.as_str().to_string(), snapshot);
        Ok(())
    }

    async fn list_objects(&self, path: &ObjectPath) -> Result<Vec<StoredObject>> {
        let entries = self.entries.lock().await;
        let entry = entries
            .get(path.as_str())
            .ok_or_else(|| Error::NotFound(path.to_string()))?;

        if !entry.kind.is_directory() {
            return Err(Error::ObjectType(path.to_string()));
        }

        let prefix = format!("{}/", path.as_str());
        let mut children = Vec::new();
        for (key, child) in entries.range(prefix.clone()..) {
            if !key.starts_with(&prefix) {
                break;
            }
            // Immediate children only
            if key[prefix.len()..].contains('/') {
                continue;
            }
            let child_path = ObjectPath::new(key.clone())?;
            children.push(child.descriptor(child_path));
        }
        Ok(children)
    }
}
