//! Integration tests for the HTTP object store client
//!
//! These tests require a live store endpoint and a signing key.
//!
//! Run with:
//! ```bash
//! export MANTLE_URL=https://store.example.com
//! export MANTLE_ACCOUNT=ops
//! export MANTLE_KEY_ID=9d:1c:f4:69:66:cb:bf:1a:40:b5:d2:c2:6a:0a:eb:2d
//! export MANTLE_KEY_FILE=~/.ssh/store_ed25519.pem
//!
//! cargo test -p mantle-http --features integration
//! ```
//!
//! Tests are skipped (not failed) when the environment is not configured.

#![cfg(feature = "integration")]

use std::sync::Arc;

use anyhow::Result;

use mantle_core::{
    ClientConfig, DirectoryOptions, LinkOptions, ObjectPath, ObjectStore, PutOptions,
};
use mantle_http::{Ed25519Signer, HttpObjectStore};

const TEST_DATA: &str = "EPISODEII_IS_BEST_EPISODE";

/// Build a client from the environment, or `None` to skip the test
fn test_store() -> Option<HttpObjectStore> {
    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(_) => {
            eprintln!("skipping: MANTLE_URL/MANTLE_ACCOUNT/MANTLE_KEY_ID not set");
            return None;
        }
    };

    let key_file = match std::env::var("MANTLE_KEY_FILE") {
        Ok(path) => path,
        Err(_) => {
            eprintln!("skipping: MANTLE_KEY_FILE not set");
            return None;
        }
    };

    let signer = Ed25519Signer::from_pem_file(&key_file).expect("failed to load signing key");
    Some(HttpObjectStore::new(config, Arc::new(signer)).expect("failed to build client"))
}

/// Create a unique test directory under the account's storage root
async fn setup_test_dir(store: &HttpObjectStore) -> Result<ObjectPath> {
    let root = ObjectPath::new(format!(
        "{}/mantle-it-{}",
        store.config().storage_root(),
        uuid::Uuid::new_v4()
    ))?;
    store.put_directory(&root, DirectoryOptions::default()).await?;
    Ok(root)
}

#[tokio::test]
async fn crud_object() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    let name = dir.join(&uuid::Uuid::new_v4().to_string())?;
    store.put(&name, TEST_DATA.into(), PutOptions::default()).await?;

    let fetched = store.get(&name).await?;
    assert_eq!(fetched.body.text().await?, TEST_DATA);

    store.delete(&name).await?;
    let err = store.get(&name).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    store.delete_recursive(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn durability_header_round_trip() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    let name = dir.join(&uuid::Uuid::new_v4().to_string())?;
    store
        .put(&name, TEST_DATA.into(), PutOptions::durability(2))
        .await?;

    let info = store.head(&name).await?;
    assert_eq!(info.durability_level()?, Some(2));

    store.delete_recursive(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn snap_link_stability() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    let target = dir.join(&uuid::Uuid::new_v4().to_string())?;
    let link = dir.join(&uuid::Uuid::new_v4().to_string())?;

    store.put(&target, TEST_DATA.into(), PutOptions::default()).await?;
    store.put_snap_link(&link, &target, LinkOptions::default()).await?;
    store
        .put(&target, "MUTATED_AFTER_LINK".into(), PutOptions::default())
        .await?;

    assert_eq!(store.get(&link).await?.body.text().await?, TEST_DATA);

    store.delete_recursive(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn list_immediate_children() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    store
        .put(&dir.join("obj-1")?, TEST_DATA.into(), PutOptions::default())
        .await?;
    store
        .put(&dir.join("obj-2")?, TEST_DATA.into(), PutOptions::default())
        .await?;
    let sub = dir.join("sub")?;
    store.put_directory(&sub, DirectoryOptions::default()).await?;
    store
        .put(&sub.join("nested")?, TEST_DATA.into(), PutOptions::default())
        .await?;

    let children = store.list_objects(&dir).await?;
    assert_eq!(children.len(), 3);
    for child in &children {
        assert!(dir.contains(&child.path));
    }

    // Listing a plain object is an object-type error
    let err = store.list_objects(&dir.join("obj-1")?).await.unwrap_err();
    assert!(matches!(err, mantle_core::Error::ObjectType(_)));

    store.delete_recursive(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn names_with_spaces_round_trip() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    let name = dir.join("spaces in the name of the file")?;
    store.put(&name, TEST_DATA.into(), PutOptions::default()).await?;

    let fetched = store.get(&name).await?;
    assert_eq!(fetched.path(), &name);
    assert_eq!(fetched.body.text().await?, TEST_DATA);

    store.delete(&name).await?;
    assert!(store.get(&name).await.unwrap_err().is_not_found());

    store.delete_recursive(&dir).await?;
    Ok(())
}

#[tokio::test]
async fn recursive_delete_removes_subtree() -> Result<()> {
    let Some(store) = test_store() else { return Ok(()) };
    let dir = setup_test_dir(&store).await?;

    let sub = dir.join("sub")?;
    store.put_directory(&sub, DirectoryOptions::default()).await?;
    store
        .put(&sub.join("nested")?, TEST_DATA.into(), PutOptions::default())
        .await?;

    store.delete_recursive(&dir).await?;
    assert!(store.head(&dir).await.unwrap_err().is_not_found());
    Ok(())
}
