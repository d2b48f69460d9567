//! mantle-http: HTTP transport for the mantle object store client
//!
//! This crate provides the implementation of the ObjectStore trait over
//! signed HTTP(S) requests, plus the Ed25519 request signer. It is the only
//! crate that touches the network.

pub mod client;
pub mod signer;

pub use client::HttpObjectStore;
pub use signer::Ed25519Signer;
