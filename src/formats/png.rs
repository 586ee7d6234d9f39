//! PNG encoding of ROI sample arrays.

use super::SampleArray;
use crate::{Error, Result};
use bytes::Bytes;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

pub const CONTENT_TYPE: &str = "image/png";

/// Encode an 8-bit grayscale sample array as PNG.
pub fn encode(sample: &SampleArray) -> Result<Bytes> {
    let expected = sample.width as usize * sample.height as usize;
    if sample.pixels.len() != expected {
        return Err(Error::Backend(format!(
            "sample array is {} bytes, expected {}x{}",
            sample.pixels.len(),
            sample.width,
            sample.height
        )));
    }

    let mut output = Vec::new();
    PngEncoder::new(&mut output)
        .write_image(
            &sample.pixels,
            sample.width,
            sample.height,
            ExtendedColorType::L8,
        )
        .map_err(|e| Error::Backend(format!("PNG encoding failed: {}", e)))?;

    Ok(Bytes::from(output))
}
