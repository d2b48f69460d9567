//! mantle-core: Core library for the mantle object store client
//!
//! This crate provides the transport-independent pieces of the client:
//! - Object paths with wire-safe percent-encoding
//! - Metadata header bag with typed accessors
//! - Descriptors and streaming payloads
//! - The ObjectStore trait for store operations
//! - The Signer seam for request authentication
//! - Client configuration
//!
//! The HTTP implementation lives in mantle-http; the in-memory store in
//! [`testing`] exercises the same contract without a network.

pub mod config;
pub mod error;
pub mod headers;
pub mod object;
pub mod path;
pub mod signer;
pub mod store;
pub mod testing;

pub use config::{ClientConfig, ClientConfigBuilder, TimeoutConfig};
pub use error::{Error, Result};
pub use headers::ObjectHeaders;
pub use object::{
    DirectoryEntry, Object, ObjectBody, ObjectData, ObjectKind, StoredObject,
};
pub use path::ObjectPath;
pub use signer::{Signer, authorization_header, signing_string};
pub use store::{DirectoryOptions, LinkOptions, ObjectStore, PutOptions};
