// SPDX-License-Identifier: GPL-3.0-only

//! Sensor runtime abstraction
//!
//! The recorder never talks to hardware directly. A sensor runtime exposes
//! its connection status, which streams are enabled and a [`FrameEvents`]
//! registry that fires once per frame-ready notification.
//!
//! ```text
//! Sensor runtime ──emit──▶ FrameEvents ──▶ handler ──▶ copy_frame ──▶ RawFrame
//! ```

pub mod copier;
pub mod events;
pub mod synthetic;
pub mod types;

pub use copier::copy_frame;
pub use events::{FrameEvents, FrameHandler, Subscription};
pub use synthetic::SyntheticSensor;
pub use types::{FrameHandle, RawFrame, SensorStatus, StreamKind};

/// A depth/color sensor as seen by the recorder
pub trait Sensor: Send + Sync {
    /// Human readable device name
    fn name(&self) -> &str;

    /// Current connection status
    fn status(&self) -> SensorStatus;

    /// Whether the given stream is enabled on the device
    fn is_stream_enabled(&self, kind: StreamKind) -> bool;

    /// Frame-ready event registry
    fn events(&self) -> &FrameEvents;
}
