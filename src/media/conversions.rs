// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion from raw sensor payloads to encodable images
//!
//! Both conversions are reinterpretations, not color-space transforms:
//!
//! - Color: packed B, G, R, unused bytes are kept byte-for-byte as [`PixelLayout::Bgr32`].
//! - Depth: each signed 16-bit sample is narrowed to `u16` with `as`, keeping
//!   the bit pattern. The low-order tracking bits stay in place unless
//!   [`DepthConversion::ClearTrackingBits`] is selected, so the default output
//!   is not pure millimeter depth.

use crate::backends::sensor::{RawFrame, StreamKind};
use crate::constants::DEPTH_TRACKING_BITS_MASK;
use crate::errors::FrameError;
use serde::{Deserialize, Serialize};

/// How raw depth samples become unsigned 16-bit gray
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DepthConversion {
    /// Direct `i16 as u16` narrowing, tracking bits kept
    #[default]
    Narrow,
    /// Narrow, then clear the low tracking bits
    ClearTrackingBits,
}

/// Sample layout of a converted image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// 4 bytes per pixel: blue, green, red, unused
    Bgr32,
    /// One unsigned 16-bit gray sample per pixel
    Gray16,
}

/// Owned samples of a converted image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSamples {
    Bgr32(Vec<u8>),
    Gray16(Vec<u16>),
}

/// Image in a stable layout, ready for encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedImage {
    pub width: u32,
    pub height: u32,
    pub samples: ImageSamples,
}

impl ConvertedImage {
    pub fn layout(&self) -> PixelLayout {
        match self.samples {
            ImageSamples::Bgr32(_) => PixelLayout::Bgr32,
            ImageSamples::Gray16(_) => PixelLayout::Gray16,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Convert a raw frame according to its stream kind
pub fn convert_frame(raw: &RawFrame, depth: DepthConversion) -> Result<ConvertedImage, FrameError> {
    match raw.kind {
        StreamKind::Color => convert_color(raw),
        StreamKind::Depth => convert_depth(raw, depth),
    }
}

/// Reinterpret a packed BGR32 color frame
pub fn convert_color(raw: &RawFrame) -> Result<ConvertedImage, FrameError> {
    check_size(raw)?;

    Ok(ConvertedImage {
        width: raw.width,
        height: raw.height,
        samples: ImageSamples::Bgr32(raw.data.clone()),
    })
}

/// Narrow signed depth samples to unsigned 16-bit gray
pub fn convert_depth(raw: &RawFrame, mode: DepthConversion) -> Result<ConvertedImage, FrameError> {
    check_size(raw)?;

    let gray: Vec<u16> = raw
        .data
        .chunks_exact(2)
        .map(|b| narrow_depth_sample(i16::from_ne_bytes([b[0], b[1]]), mode))
        .collect();

    Ok(ConvertedImage {
        width: raw.width,
        height: raw.height,
        samples: ImageSamples::Gray16(gray),
    })
}

/// Convert a single depth sample
#[inline]
pub fn narrow_depth_sample(sample: i16, mode: DepthConversion) -> u16 {
    let value = sample as u16;
    match mode {
        DepthConversion::Narrow => value,
        DepthConversion::ClearTrackingBits => value & !DEPTH_TRACKING_BITS_MASK,
    }
}

fn check_size(raw: &RawFrame) -> Result<(), FrameError> {
    if raw.width == 0 || raw.height == 0 {
        return Err(FrameError::EmptyFrame);
    }
    let expected = raw.expected_len().ok_or(FrameError::TooLarge {
        width: raw.width,
        height: raw.height,
    })?;
    if raw.data.len() != expected {
        return Err(FrameError::SizeMismatch {
            expected,
            actual: raw.data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth_frame(samples: &[i16], width: u32, height: u32) -> RawFrame {
        RawFrame {
            kind: StreamKind::Depth,
            width,
            height,
            data: samples.iter().flat_map(|s| s.to_ne_bytes()).collect(),
        }
    }

    #[test]
    fn test_depth_narrowing_keeps_tracking_bits() {
        assert_eq!(narrow_depth_sample(0x0301, DepthConversion::Narrow), 0x0301);

        let image = convert_depth(&depth_frame(&[0x0301], 1, 1), DepthConversion::Narrow).unwrap();
        assert_eq!(image.samples, ImageSamples::Gray16(vec![0x0301]));
    }

    #[test]
    fn test_negative_depth_keeps_bit_pattern() {
        assert_eq!(narrow_depth_sample(-1, DepthConversion::Narrow), 0xFFFF);
        assert_eq!(narrow_depth_sample(i16::MIN, DepthConversion::Narrow), 0x8000);
    }

    #[test]
    fn test_clear_tracking_bits_is_opt_in() {
        assert_eq!(
            narrow_depth_sample(0x0301, DepthConversion::ClearTrackingBits),
            0x0300
        );
        assert_eq!(
            narrow_depth_sample(0x0307, DepthConversion::ClearTrackingBits),
            0x0300
        );
        assert_eq!(DepthConversion::default(), DepthConversion::Narrow);
    }

    #[test]
    fn test_color_is_a_reinterpretation() {
        let (w, h) = (3u32, 2u32);
        let data: Vec<u8> = (0..(w * h * 4) as u8).collect();
        let raw = RawFrame {
            kind: StreamKind::Color,
            width: w,
            height: h,
            data: data.clone(),
        };

        let image = convert_color(&raw).unwrap();
        assert_eq!(image.layout(), PixelLayout::Bgr32);
        assert_eq!(image.pixel_count(), 6);
        let ImageSamples::Bgr32(samples) = &image.samples else {
            panic!("expected BGR32 samples");
        };
        assert_eq!(&samples[0..3], &data[0..3]);
        assert_eq!(samples, &data);
    }

    #[test]
    fn test_size_mismatch_is_rejected() {
        let raw = RawFrame {
            kind: StreamKind::Color,
            width: 2,
            height: 2,
            data: vec![0; 15],
        };
        assert_eq!(
            convert_color(&raw),
            Err(FrameError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_oversized_dimensions_are_rejected() {
        let raw = RawFrame {
            kind: StreamKind::Color,
            width: u32::MAX,
            height: u32::MAX,
            data: vec![0; 4],
        };
        assert_eq!(
            convert_frame(&raw, DepthConversion::Narrow),
            Err(FrameError::TooLarge {
                width: u32::MAX,
                height: u32::MAX
            })
        );
    }

    #[test]
    fn test_empty_frame_is_rejected() {
        let raw = depth_frame(&[], 0, 4);
        assert_eq!(
            convert_depth(&raw, DepthConversion::Narrow),
            Err(FrameError::EmptyFrame)
        );
    }

    #[test]
    fn test_convert_frame_dispatches_on_kind() {
        let image = convert_frame(&depth_frame(&[1, 2], 2, 1), DepthConversion::Narrow).unwrap();
        assert_eq!(image.layout(), PixelLayout::Gray16);
    }
}
