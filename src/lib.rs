// SPDX-License-Identifier: MPL-2.0

//! Depth Recorder - frame capture and recording for depth/color sensors
//!
//! This library implements the recording path between a sensor runtime and
//! the filesystem: frame-ready events are copied out of sensor-owned buffers,
//! converted to a stable pixel layout and written as lossless PNG files.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`backends`]: Sensor abstraction, frame events and a synthetic sensor
//! - [`media`]: Raw payload to image conversion
//! - [`pipelines`]: Encoding, write dispatch and the recording state machine
//! - [`config`]: User configuration handling
//! - [`storage`]: Recording directory and frame file naming
//!
//! # Example
//!
//! ```no_run
//! use depth_recorder::backends::sensor::SyntheticSensor;
//! use depth_recorder::pipelines::{ImmediateDispatcher, Recorder, RecorderOptions};
//! use std::sync::Arc;
//!
//! let sensor = Arc::new(SyntheticSensor::new(320, 240));
//! let mut recorder = Recorder::new(
//!     RecorderOptions::new("/tmp/recordings"),
//!     Arc::new(ImmediateDispatcher),
//! );
//! recorder.attach_sensor(sensor.clone());
//! let _dir = recorder.start(Some("Test"))?;
//! sensor.tick();
//! recorder.stop();
//! # Ok::<(), depth_recorder::errors::AppError>(())
//! ```

pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use backends::sensor::{Sensor, StreamKind, SyntheticSensor};
pub use config::{Config, CounterMode, WriteMode};
pub use errors::{AppError, AppResult};
pub use pipelines::{Recorder, RecorderOptions, RecorderState, SessionSummary};
