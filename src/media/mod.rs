// SPDX-License-Identifier: GPL-3.0-only

//! Media conversion
//!
//! Turns raw sensor payloads into images with a stable sample layout.

pub mod conversions;

pub use conversions::{
    ConvertedImage, DepthConversion, ImageSamples, PixelLayout, convert_color, convert_depth,
    convert_frame,
};
