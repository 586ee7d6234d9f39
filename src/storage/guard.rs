//! Write capability enforcement.

use super::Store;
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;

/// Wraps a store and, when declared read-only, refuses `put` and `delete`
/// without calling the inner store. Reads always pass through.
pub struct AccessGuard<S> {
    inner: S,
    read_only: bool,
}

impl<S> AccessGuard<S> {
    pub fn new(inner: S, read_only: bool) -> Self {
        Self { inner, read_only }
    }

    pub fn read_only(inner: S) -> Self {
        Self::new(inner, true)
    }

    pub fn read_write(inner: S) -> Self {
        Self::new(inner, false)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn refuse(&self, op: &str) -> Error {
        tracing::error!(op, "write attempted on read-only store");
        Error::UnsupportedOperation(format!("{} on read-only store", op))
    }
}

#[async_trait]
impl<K, S> Store<K> for AccessGuard<S>
where
    K: ?Sized + Sync,
    S: Store<K>,
{
    async fn get(&self, key: &K) -> Result<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &K, value: Bytes) -> Result<()> {
        if self.read_only {
            return Err(self.refuse("put"));
        }
        self.inner.put(key, value).await
    }

    async fn exists(&self, key: &K) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &K) -> Result<()> {
        if self.read_only {
            return Err(self.refuse("delete"));
        }
        self.inner.delete(key).await
    }

    fn read_only(&self) -> bool {
        self.read_only || self.inner.read_only()
    }
}
