//! Raw IFCB bin files.
//!
//! An instrument run ("bin") is written as a set of sibling files sharing the
//! bin name: a `.hdr` text header, an `.adc` table with one row per trigger,
//! and a `.roi` file holding the concatenated 8-bit grayscale pixels of every
//! captured region of interest.
//!
//! - [`adc`] - parses ROI geometry out of the `.adc` table
//! - [`png`] - encodes a sample array as a PNG image
//!
//! [`RawBin`] ties the two files together and reads one target at a time.

pub mod adc;
pub mod png;

pub use adc::{AdcSchema, RoiGeometry};

use crate::{Error, Result};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

pub const ADC_EXTENSION: &str = "adc";
pub const ROI_EXTENSION: &str = "roi";

/// Pixels of one ROI, `height` rows of `width` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleArray {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Paths of one raw bin on disk.
#[derive(Debug, Clone)]
pub struct RawBin {
    adc_path: PathBuf,
    roi_path: PathBuf,
    schema: AdcSchema,
}

impl RawBin {
    /// `adc_path` is the bin's `.adc` file; the `.roi` file sits next to it.
    pub fn new(adc_path: PathBuf, schema: AdcSchema) -> Self {
        let roi_path = adc_path.with_extension(ROI_EXTENSION);
        Self {
            adc_path,
            roi_path,
            schema,
        }
    }

    /// Target numbers that carry an image, in file order.
    pub fn targets(&self) -> Result<Vec<u32>> {
        let rows = adc::read_geometry(&self.adc_path, self.schema)?;
        Ok(rows
            .into_iter()
            .filter(|(_, g)| g.has_image())
            .map(|(target, _)| target)
            .collect())
    }

    /// Whether `target` has an image in this bin.
    pub fn contains(&self, target: u32) -> Result<bool> {
        Ok(self.geometry(target)?.is_some())
    }

    /// Geometry of `target`, if it exists and carries an image.
    pub fn geometry(&self, target: u32) -> Result<Option<RoiGeometry>> {
        let rows = adc::read_geometry(&self.adc_path, self.schema)?;
        Ok(rows
            .into_iter()
            .find(|(t, _)| *t == target)
            .map(|(_, g)| g)
            .filter(RoiGeometry::has_image))
    }

    /// Read the pixels of `target`. `None` when the bin has no such target.
    pub fn read_target(&self, target: u32) -> Result<Option<SampleArray>> {
        let Some(geometry) = self.geometry(target)? else {
            return Ok(None);
        };
        let pixels = read_pixels(&self.roi_path, &geometry)?;
        Ok(Some(SampleArray {
            width: geometry.width,
            height: geometry.height,
            pixels,
        }))
    }
}

fn read_pixels(roi_path: &Path, geometry: &RoiGeometry) -> Result<Vec<u8>> {
    let len = geometry.byte_len();
    let mut file = File::open(roi_path)
        .map_err(|e| Error::Backend(format!("cannot open {}: {}", roi_path.display(), e)))?;
    let file_len = file.metadata()?.len();
    let end = geometry.start_byte.checked_add(len);
    if end.is_none_or(|end| end > file_len) {
        return Err(Error::Backend(format!(
            "{} truncated: need {} bytes at offset {}, file is {} bytes",
            roi_path.display(),
            len,
            geometry.start_byte,
            file_len
        )));
    }

    file.seek(SeekFrom::Start(geometry.start_byte))?;
    let mut pixels = vec![0u8; len as usize];
    file.read_exact(&mut pixels)?;
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_bin(dir: &Path, name: &str, adc: &str, roi: &[u8]) -> PathBuf {
        let adc_path = dir.join(format!("{}.adc", name));
        fs::write(&adc_path, adc).unwrap();
        fs::write(dir.join(format!("{}.roi", name)), roi).unwrap();
        adc_path
    }

    fn dated_row(width: u32, height: u32, start: u64) -> String {
        let mut cols = vec!["0".to_string(); 24];
        cols[15] = width.to_string();
        cols[16] = height.to_string();
        cols[17] = start.to_string();
        cols.join(",")
    }

    #[test]
    fn test_targets_skip_empty_rows() {
        let dir = tempfile::tempdir().unwrap();
        let adc = [dated_row(2, 2, 0), dated_row(0, 0, 0), dated_row(3, 1, 4)].join("\n");
        let path = write_bin(dir.path(), "D20170512T092752_IFCB010", &adc, &[0u8; 7]);
        let bin = RawBin::new(path, AdcSchema::Dated);

        assert_eq!(bin.targets().unwrap(), vec![1, 3]);
        assert!(bin.contains(1).unwrap());
        assert!(!bin.contains(2).unwrap());
        assert!(!bin.contains(4).unwrap());
    }

    #[test]
    fn test_read_target_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let adc = [dated_row(2, 2, 0), dated_row(3, 1, 4)].join("\n");
        let roi = [1, 2, 3, 4, 10, 20, 30];
        let path = write_bin(dir.path(), "D20170512T092752_IFCB010", &adc, &roi);
        let bin = RawBin::new(path, AdcSchema::Dated);

        let sample = bin.read_target(2).unwrap().unwrap();
        assert_eq!(sample.width, 3);
        assert_eq!(sample.height, 1);
        assert_eq!(sample.pixels, vec![10, 20, 30]);
        assert!(bin.read_target(9).unwrap().is_none());
    }

    #[test]
    fn test_truncated_roi_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bin(
            dir.path(),
            "D20170512T092752_IFCB010",
            &dated_row(4, 4, 0),
            &[0u8; 5],
        );
        let bin = RawBin::new(path, AdcSchema::Dated);
        assert!(matches!(bin.read_target(1), Err(Error::Backend(_))));
    }

    #[test]
    fn test_offset_past_u64_is_backend_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bin(
            dir.path(),
            "D20170512T092752_IFCB010",
            &dated_row(u32::MAX, u32::MAX, 1 << 63),
            &[0u8; 5],
        );
        let bin = RawBin::new(path, AdcSchema::Dated);
        assert!(matches!(bin.read_target(1), Err(Error::Backend(_))));
    }
}
