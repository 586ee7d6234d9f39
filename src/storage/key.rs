//! Object keys for ROI images.
//!
//! Images live under `{prefix}/{year}/{bin}/{target:05}.png`, where `year`
//! is taken from dated bin names and is `legacy` for everything else.

use super::{KeyListing, Store};
use crate::{Error, Result, pid::Pid, pid::year_token};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

/// Derive the object key for `pid`. Trailing `/` on `prefix` is ignored and
/// an empty prefix contributes no leading segment.
pub fn derive_key(pid: &Pid, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let bin = pid.bin_identifier();
    let year = year_token(bin);
    if prefix.is_empty() {
        format!("{}/{}/{:05}.png", year, bin, pid.target_index())
    } else {
        format!("{}/{}/{}/{:05}.png", prefix, year, bin, pid.target_index())
    }
}

/// Adapts an object store keyed by strings into a store keyed by pids.
pub struct KeyedRoiStore<B> {
    inner: B,
    prefix: String,
    list_prefix: String,
}

impl<B> KeyedRoiStore<B> {
    pub fn new(inner: B, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        let list_prefix = if prefix.is_empty() {
            String::new()
        } else {
            format!("{}/", prefix)
        };
        Self {
            inner,
            prefix,
            list_prefix,
        }
    }

    pub fn key_for(&self, pid: &Pid) -> String {
        derive_key(pid, &self.prefix)
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: KeyListing> KeyedRoiStore<B> {
    /// List every image key under this store's prefix.
    pub fn list_keys(&self) -> BoxStream<'_, Result<String>> {
        self.inner.list_keys(&self.list_prefix)
    }
}

#[async_trait]
impl<B: Store<str>> Store<Pid> for KeyedRoiStore<B> {
    async fn get(&self, pid: &Pid) -> Result<Bytes> {
        let key = self.key_for(pid);
        tracing::debug!(%pid, key = %key, "fetching object");
        match self.inner.get(&key).await {
            Ok(bytes) => {
                tracing::debug!(%pid, bytes = bytes.len(), "fetched object");
                Ok(bytes)
            }
            Err(Error::NotFound(_)) => Err(Error::NotFound(key)),
            Err(e) => {
                tracing::warn!(%pid, key = %key, error = %e, "object fetch failed");
                Err(e)
            }
        }
    }

    async fn put(&self, pid: &Pid, value: Bytes) -> Result<()> {
        let key = self.key_for(pid);
        tracing::debug!(%pid, key = %key, bytes = value.len(), "storing object");
        self.inner.put(&key, value).await
    }

    async fn exists(&self, pid: &Pid) -> Result<bool> {
        self.inner.exists(&self.key_for(pid)).await
    }

    async fn delete(&self, pid: &Pid) -> Result<()> {
        let key = self.key_for(pid);
        tracing::debug!(%pid, key = %key, "deleting object");
        self.inner.delete(&key).await
    }

    fn read_only(&self) -> bool {
        self.inner.read_only()
    }
}
