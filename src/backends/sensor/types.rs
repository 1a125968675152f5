// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the sensor abstraction

//! Frame and stream types exchanged with the sensor runtime

use crate::constants::{COLOR_BYTES_PER_PIXEL, DEPTH_BYTES_PER_PIXEL};

/// Stream a frame belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    /// Packed 32-bit color (B, G, R, unused)
    Color,
    /// Signed 16-bit depth with tracking bits in the low-order bits
    Depth,
}

impl StreamKind {
    pub const ALL: [StreamKind; 2] = [StreamKind::Color, StreamKind::Depth];

    /// Prefix used for frame file names
    pub fn file_prefix(&self) -> &'static str {
        match self {
            StreamKind::Color => "color",
            StreamKind::Depth => "depth",
        }
    }

    /// Raw payload bytes per pixel
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            StreamKind::Color => COLOR_BYTES_PER_PIXEL,
            StreamKind::Depth => DEPTH_BYTES_PER_PIXEL,
        }
    }
}

impl std::fmt::Display for StreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_prefix())
    }
}

/// Connection status reported by the sensor runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensorStatus {
    /// Connected and streaming
    Connected,
    /// Connected but not started
    Initializing,
    /// Unplugged or powered off
    #[default]
    Disconnected,
}

impl SensorStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, SensorStatus::Connected)
    }
}

/// Borrowed, sensor-owned frame
///
/// Only valid for the duration of the frame-ready callback. The payload
/// length is the declared length of the hardware buffer; for color it is
/// `width * height * 4`, for depth `width * height * 2` (native-endian `i16`).
#[derive(Debug, Clone, Copy)]
pub struct FrameHandle<'a> {
    kind: StreamKind,
    width: u32,
    height: u32,
    payload: &'a [u8],
}

impl<'a> FrameHandle<'a> {
    pub fn new(kind: StreamKind, width: u32, height: u32, payload: &'a [u8]) -> Self {
        Self {
            kind,
            width,
            height,
            payload,
        }
    }

    pub fn kind(&self) -> StreamKind {
        self.kind
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Declared payload length in bytes
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Copy the payload into `dst`, which must be exactly `payload_len()` bytes
    pub fn copy_pixel_data_to(&self, dst: &mut [u8]) {
        dst.copy_from_slice(self.payload);
    }
}

/// Owned copy of a frame's raw pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub kind: StreamKind,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl RawFrame {
    /// Payload size implied by the reported dimensions, `None` on overflow
    pub fn expected_len(&self) -> Option<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)?
            .checked_mul(self.kind.bytes_per_pixel())
    }
}
