// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Label used when the user leaves the recording name blank
pub const DEFAULT_RECORDING_LABEL: &str = "Recording";

/// Timestamp appended to the label, `yyyyMMdd_HHmmss`
pub const SESSION_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Zero-padding width of the frame index in file names
pub const FRAME_INDEX_WIDTH: usize = 6;

/// Extension of every frame file
pub const FRAME_FILE_EXTENSION: &str = "png";

/// Directory name under the user's video directory
pub const RECORDINGS_DIR_NAME: &str = "Recordings";

/// Application directory name under the user's config directory
pub const APP_DIR_NAME: &str = "depth-recorder";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Current configuration format version
pub const CONFIG_VERSION: u32 = 1;

/// Bytes per pixel of the packed color stream (B, G, R, unused)
pub const COLOR_BYTES_PER_PIXEL: usize = 4;

/// Bytes per pixel of the depth stream (one signed 16-bit sample)
pub const DEPTH_BYTES_PER_PIXEL: usize = 2;

/// Low-order depth bits the sensor uses for player/tracking indices
pub const DEPTH_TRACKING_BITS_MASK: u16 = 0b111;

/// Synthetic sensor defaults
pub mod synthetic {
    use super::Duration;

    pub const DEFAULT_WIDTH: u32 = 320;
    pub const DEFAULT_HEIGHT: u32 = 240;
    pub const DEFAULT_FPS: u32 = 30;

    /// Depth ramp range in millimeters
    pub const DEPTH_NEAR_MM: u16 = 800;
    pub const DEPTH_FAR_MM: u16 = 4000;

    /// Frame interval for a given rate
    pub fn frame_interval(fps: u32) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(fps.max(1)))
    }
}
