//! S3 storage backend for ROI images.
//!
//! This module provides an S3-based implementation of the [`Store`] trait
//! over raw object keys. Pid-to-key mapping is layered on top by
//! [`KeyedRoiStore`](super::KeyedRoiStore).
//!
//! # Features
//!
//! - Static access/secret key credentials
//! - Support for custom S3 endpoints (MinIO, Ceph, LocalStack, etc.)
//! - Lazy, paginated key listing
//! - Client-side operation timeout, surfaced as a backend error

use super::{KeyListing, Store};
use crate::{Error, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use std::time::Duration;

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint_url: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub timeout: Duration,
}

/// S3 storage backend keyed by raw object keys.
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Build a client from `settings`.
    ///
    /// No request is made here; a bad bucket or bad credentials show up on
    /// the first operation as [`Error::Backend`].
    pub async fn new(settings: S3Settings) -> Result<Self> {
        let credentials = Credentials::new(
            settings.access_key,
            settings.secret_key,
            None,
            None,
            "ifcb-roi-static",
        );

        let sdk_config = aws_config::from_env()
            .region(aws_config::Region::new(settings.region))
            .credentials_provider(credentials)
            .load()
            .await;

        // Build S3 client with optional custom endpoint
        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config).timeout_config(
            TimeoutConfig::builder()
                .operation_timeout(settings.timeout)
                .build(),
        );
        if let Some(endpoint) = settings.endpoint_url {
            s3_config = s3_config.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self::from_client(
            Client::from_conf(s3_config.build()),
            settings.bucket,
        ))
    }

    pub fn from_client(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn backend_error(&self, op: &str, key: &str, err: impl std::fmt::Display) -> Error {
        tracing::warn!(bucket = %self.bucket, key, op, error = %err, "S3 request failed");
        Error::Backend(format!("S3 {} s3://{}/{} failed: {}", op, self.bucket, key, err))
    }
}

#[async_trait]
impl Store<str> for S3Store {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing {
                    Error::NotFound(key.to_string())
                } else {
                    self.backend_error("get_object", key, aws_sdk_s3::error::DisplayErrorContext(&e))
                }
            })?;

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| self.backend_error("read body", key, e))?;

        Ok(body.into_bytes())
    }

    async fn put(&self, key: &str, value: Bytes) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("image/png")
            .body(ByteStream::from(value))
            .send()
            .await
            .map_err(|e| {
                self.backend_error("put_object", key, aws_sdk_s3::error::DisplayErrorContext(&e))
            })?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(self.backend_error(
                "head_object",
                key,
                aws_sdk_s3::error::DisplayErrorContext(&e),
            )),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // S3 reports success for keys that do not exist.
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                self.backend_error("delete_object", key, aws_sdk_s3::error::DisplayErrorContext(&e))
            })?;
        Ok(())
    }
}

enum Page {
    First,
    After(String),
    Done,
}

impl KeyListing for S3Store {
    fn list_keys<'a>(&'a self, prefix: &'a str) -> BoxStream<'a, Result<String>> {
        stream::unfold(Page::First, move |page| async move {
            let token = match page {
                Page::Done => return None,
                Page::First => None,
                Page::After(token) => Some(token),
            };

            let mut request = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(token);
            if !prefix.is_empty() {
                request = request.prefix(prefix);
            }

            match request.send().await {
                Ok(response) => {
                    let keys: Vec<Result<String>> = response
                        .contents()
                        .iter()
                        .filter_map(|object| object.key())
                        .map(|key| Ok(key.to_string()))
                        .collect();
                    // A truncated page without a token would loop forever.
                    let next = match response.next_continuation_token() {
                        Some(token) if response.is_truncated().unwrap_or(false) => {
                            Page::After(token.to_string())
                        }
                        _ => Page::Done,
                    };
                    tracing::debug!(bucket = %self.bucket, prefix, keys = keys.len(), "listed page");
                    Some((stream::iter(keys), next))
                }
                Err(e) => {
                    let err = self.backend_error(
                        "list_objects_v2",
                        prefix,
                        aws_sdk_s3::error::DisplayErrorContext(&e),
                    );
                    Some((stream::iter(vec![Err(err)]), Page::Done))
                }
            }
        })
        .flatten()
        .boxed()
    }
}
