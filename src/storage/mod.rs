//! Storage backend abstraction for ROI images.
//!
//! Every backend speaks the same byte-oriented [`Store`] contract, keyed
//! either by raw object keys (`Store<str>`) or by parsed ROI identifiers
//! (`Store<Pid>`). Wrappers implement the same trait, so a deployment is
//! assembled by composition:
//!
//! - [`S3Store`] - S3-compatible object store (feature `s3`)
//! - [`MemoryStore`] - in-process object store
//! - [`KeyedRoiStore`] - maps pids onto object keys of any object store
//! - [`BinDirStore`] - read view over a directory of raw IFCB bins
//! - [`Base64Store`] - base64 transport encoding on read, decoding on write
//! - [`AccessGuard`] - rejects writes against read-only deployments
//!
//! # Example
//!
//! ```no_run
//! use ifcb_roi::storage::{AccessGuard, Base64Store, BinDirStore};
//! use std::path::PathBuf;
//!
//! let store = AccessGuard::read_only(Base64Store::new(BinDirStore::new(
//!     PathBuf::from("./data"),
//! )));
//! ```

mod bins;
mod guard;
pub mod key;
mod memory;
#[cfg(feature = "s3")]
mod s3;
pub mod transform;

pub use bins::BinDirStore;
pub use guard::AccessGuard;
pub use key::{KeyedRoiStore, derive_key};
pub use memory::MemoryStore;
pub use transform::Base64Store;
#[cfg(feature = "s3")]
pub use s3::{S3Settings, S3Store};

use crate::Result;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Byte-oriented store contract shared by backends and wrappers.
#[async_trait]
pub trait Store<K: ?Sized + Sync>: Send + Sync {
    /// Fetch the value stored under `key`, or [`Error::NotFound`](crate::Error::NotFound).
    async fn get(&self, key: &K) -> Result<Bytes>;

    /// Store `value` under `key`, replacing any previous value.
    async fn put(&self, key: &K, value: Bytes) -> Result<()>;

    /// Check whether `key` is present. Absence is `Ok(false)`, never an error.
    async fn exists(&self, key: &K) -> Result<bool>;

    /// Remove `key`. Removing an absent key succeeds.
    async fn delete(&self, key: &K) -> Result<()>;

    /// Whether mutating calls are refused.
    fn read_only(&self) -> bool {
        false
    }
}

/// Enumeration of raw keys in an object store.
pub trait KeyListing: Send + Sync {
    /// Lazily list every key under `prefix`.
    ///
    /// Each call starts a fresh enumeration. Order is whatever the backend
    /// returns.
    fn list_keys<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String>>;
}
