// SPDX-License-Identifier: GPL-3.0-only

//! Lossless frame encoding
//!
//! Color frames are written as 8-bit RGB PNG (the unused fourth byte is
//! dropped), depth frames as 16-bit grayscale PNG. Writes are synchronous
//! and create or truncate the destination.

use crate::errors::FrameError;
use crate::media::{ConvertedImage, ImageSamples};
use image::{ImageBuffer, ImageFormat, Luma, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// PNG encoder for converted frames
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameEncoder;

impl FrameEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a converted image to PNG bytes
    pub fn encode(&self, image: &ConvertedImage) -> Result<Vec<u8>, FrameError> {
        let mut buffer = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        match &image.samples {
            ImageSamples::Bgr32(bgr) => {
                let rgb: Vec<u8> = bgr.chunks_exact(4).flat_map(|p| [p[2], p[1], p[0]]).collect();
                let rgb_image = RgbImage::from_raw(image.width, image.height, rgb)
                    .ok_or_else(|| FrameError::EncodingFailed("Color buffer too small".into()))?;
                rgb_image.write_to(&mut cursor, ImageFormat::Png)?;
            }
            ImageSamples::Gray16(gray) => {
                let gray_image =
                    ImageBuffer::<Luma<u16>, Vec<u16>>::from_raw(image.width, image.height, gray.clone())
                        .ok_or_else(|| FrameError::EncodingFailed("Depth buffer too small".into()))?;
                gray_image.write_to(&mut cursor, ImageFormat::Png)?;
            }
        }

        debug!(
            width = image.width,
            height = image.height,
            layout = ?image.layout(),
            size = buffer.len(),
            "Encoded frame"
        );
        Ok(buffer)
    }

    /// Encode and write to `path`, creating or truncating the file
    pub fn write(&self, image: &ConvertedImage, path: &Path) -> Result<PathBuf, FrameError> {
        let data = self.encode(image)?;
        std::fs::write(path, &data)
            .map_err(|e| FrameError::WriteFailed(format!("{}: {}", path.display(), e)))?;
        Ok(path.to_path_buf())
    }
}
