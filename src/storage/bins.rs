//! Read-only store over a directory tree of raw IFCB bins.
//!
//! Nothing is stored as PNG here: each `get` locates the bin's `.adc`/`.roi`
//! pair beneath the root, reads the single requested target and encodes it.
//! File access runs on the blocking pool and the files are closed again
//! before the call returns.

use super::Store;
use crate::formats::{ADC_EXTENSION, AdcSchema, ROI_EXTENSION, RawBin, png};
use crate::pid::{Pid, is_dated_bin};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub struct BinDirStore {
    root: PathBuf,
}

impl BinDirStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(PathBuf) -> Result<T> + Send + 'static,
    {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || op(root))
            .await
            .map_err(|e| Error::Backend(format!("bin reader task failed: {}", e)))?
    }
}

fn locate_bin(root: &Path, bin: &str) -> Result<Option<RawBin>> {
    if !root.is_dir() {
        return Err(Error::Backend(format!(
            "data directory {} is not readable",
            root.display()
        )));
    }
    if bin.is_empty() || bin.contains(['/', '\\']) || bin.starts_with('.') {
        return Ok(None);
    }

    let adc_name = format!("{}.{}", bin, ADC_EXTENSION);
    let mut unreadable: Option<walkdir::Error> = None;
    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || may_hold_bin(entry, bin));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "unreadable entry under data directory");
                if unreadable.is_none() {
                    unreadable = Some(e);
                }
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name().to_str() != Some(adc_name.as_str()) {
            continue;
        }
        let adc_path = entry.into_path();
        let roi_path = adc_path.with_extension(ROI_EXTENSION);
        match std::fs::metadata(&roi_path) {
            Ok(meta) if meta.is_file() => {
                tracing::debug!(bin, path = %adc_path.display(), "located bin");
                return Ok(Some(RawBin::new(adc_path, AdcSchema::for_bin(bin))));
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(Error::Backend(format!(
                    "cannot stat {}: {}",
                    roi_path.display(),
                    e
                )));
            }
        }
    }

    // An unreadable subtree may hold the bin, so absence cannot be claimed.
    match unreadable {
        Some(e) => {
            let path = e.path().unwrap_or(root).display().to_string();
            Err(Error::Backend(format!(
                "cannot search {} for bin {}: {}",
                path, bin, e
            )))
        }
        None => Ok(None),
    }
}

/// Prune directories that belong to another year or another day.
///
/// Archives are laid out as `<root>/<YYYY>/D<YYYYMMDD>/`; directories named
/// like a year or a day are only entered when they match the bin's date.
/// Legacy bins carry no date, so nothing is pruned for them.
fn may_hold_bin(entry: &walkdir::DirEntry, bin: &str) -> bool {
    if !entry.file_type().is_dir() || !is_dated_bin(bin) {
        return true;
    }
    let Some(name) = entry.file_name().to_str() else {
        return true;
    };
    let b = name.as_bytes();
    let is_year = b.len() == 4 && b.iter().all(u8::is_ascii_digit);
    let is_day = b.len() == 9 && b[0] == b'D' && b[1..].iter().all(u8::is_ascii_digit);
    if is_year {
        name == &bin[1..5]
    } else if is_day {
        name == &bin[..9]
    } else {
        true
    }
}

#[async_trait]
impl Store<Pid> for BinDirStore {
    async fn get(&self, pid: &Pid) -> Result<Bytes> {
        let bin = pid.bin_identifier().to_string();
        let target = pid.target_index();
        let label = pid.to_string();

        let encoded = self
            .blocking(move |root| {
                let raw = locate_bin(&root, &bin)?
                    .ok_or_else(|| Error::NotFound(format!("bin {}", bin)))?;
                let sample = raw
                    .read_target(target)?
                    .ok_or_else(|| Error::NotFound(format!("target {} in bin {}", target, bin)))?;
                png::encode(&sample)
            })
            .await;

        match &encoded {
            Ok(bytes) => tracing::debug!(pid = %label, bytes = bytes.len(), "encoded ROI"),
            Err(Error::NotFound(what)) => tracing::debug!(pid = %label, "{} not found", what),
            Err(e) => tracing::warn!(pid = %label, error = %e, "ROI read failed"),
        }
        encoded
    }

    async fn put(&self, _pid: &Pid, _value: Bytes) -> Result<()> {
        Err(Error::UnsupportedOperation(
            "put on raw bin directory".to_string(),
        ))
    }

    async fn exists(&self, pid: &Pid) -> Result<bool> {
        let bin = pid.bin_identifier().to_string();
        let target = pid.target_index();
        self.blocking(move |root| match locate_bin(&root, &bin)? {
            Some(raw) => raw.contains(target),
            None => Ok(false),
        })
        .await
    }

    async fn delete(&self, _pid: &Pid) -> Result<()> {
        Err(Error::UnsupportedOperation(
            "delete on raw bin directory".to_string(),
        ))
    }

    fn read_only(&self) -> bool {
        true
    }
}
