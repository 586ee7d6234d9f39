//! Base64 transport encoding over any store.
//!
//! Values come out of [`Base64Store::get`] as standard base64 text and go
//! into [`Base64Store::put`] the same way; the inner store only ever sees
//! raw bytes.

use super::Store;
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

pub fn encode(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

pub fn decode(text: &[u8]) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| Error::Transform(format!("invalid base64 payload: {}", e)))
}

pub struct Base64Store<S> {
    inner: S,
}

impl<S> Base64Store<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<K, S> Store<K> for Base64Store<S>
where
    K: ?Sized + Sync,
    S: Store<K>,
{
    async fn get(&self, key: &K) -> Result<Bytes> {
        let raw = self.inner.get(key).await?;
        Ok(Bytes::from(encode(&raw)))
    }

    async fn put(&self, key: &K, value: Bytes) -> Result<()> {
        let raw = decode(&value)?;
        self.inner.put(key, Bytes::from(raw)).await
    }

    async fn exists(&self, key: &K) -> Result<bool> {
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &K) -> Result<()> {
        self.inner.delete(key).await
    }

    fn read_only(&self) -> bool {
        self.inner.read_only()
    }
}
