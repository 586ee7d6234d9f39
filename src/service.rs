//! ROI lookup facade used by the HTTP layer.

use crate::formats::png::CONTENT_TYPE;
use crate::pid::Pid;
use crate::storage::Store;
use crate::types::RoiImage;
use crate::{Error, Result};
use std::sync::Arc;

/// Resolves pids against the configured store.
///
/// The store is expected to yield transport-encoded (base64) text, i.e. to be
/// wrapped in a [`Base64Store`](crate::storage::Base64Store).
#[derive(Clone)]
pub struct RoiService {
    store: Arc<dyn Store<Pid>>,
}

impl RoiService {
    pub fn new(store: Arc<dyn Store<Pid>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store<Pid>> {
        &self.store
    }

    /// Look up one ROI image by its raw pid string.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_roi(&self, raw_pid: &str) -> Result<RoiImage> {
        let pid = Pid::parse(raw_pid)?;
        tracing::debug!(bin = pid.bin_identifier(), target = pid.target_index(), "parsed pid");

        let encoded = match self.store.get(&pid).await {
            Ok(encoded) => encoded,
            Err(Error::NotFound(detail)) => {
                tracing::debug!(%detail, "ROI not found");
                return Err(Error::NotFound(raw_pid.to_string()));
            }
            Err(e) => return Err(e),
        };

        let image = String::from_utf8(encoded.to_vec())
            .map_err(|_| Error::Transform("store returned non-text payload".to_string()))?;
        tracing::debug!(bytes = image.len(), "retrieved encoded image");

        Ok(RoiImage {
            pid: raw_pid.to_string(),
            bin_pid: pid.bin_identifier().to_string(),
            content_type: CONTENT_TYPE,
            image,
        })
    }
}
