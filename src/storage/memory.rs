//! In-process object store.
//!
//! Holds objects in a sorted map behind an async lock. Useful for tests and
//! for running the service without an S3 endpoint.

use super::{KeyListing, Store};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Bytes>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl Store<str> for MemoryStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        self.objects.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }
}

impl KeyListing for MemoryStore {
    fn list_keys<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String>> {
        // Snapshot at first poll so the stream never holds the lock.
        stream::once(async move {
            let objects = self.objects.read().await;
            let keys: Vec<Result<String>> = objects
                .keys()
                .filter(|k| k.starts_with(prefix))
                .map(|k| Ok(k.clone()))
                .collect();
            stream::iter(keys)
        })
        .flatten()
        .boxed()
    }
}
