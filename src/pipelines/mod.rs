// SPDX-License-Identifier: MPL-2.0

//! Recording pipeline
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Frame event  │ ──▶ │ copy_frame   │ ──▶ │ FrameDispatcher   │ ──▶ │  PNG file    │
//! │ (borrowed)   │     │ (owned copy) │     │ convert → encode  │     │              │
//! └──────────────┘     └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! - [`recording`]: Idle/Active state machine and the per-session frame counter
//! - [`dispatch`]: Immediate or serial deferred execution of the write step
//! - [`encoding`]: Lossless PNG encoding of converted frames

pub mod dispatch;
pub mod encoding;
pub mod recording;

pub use dispatch::{FrameDispatcher, ImmediateDispatcher, SerialDispatcher};
pub use encoding::FrameEncoder;
pub use recording::{Recorder, RecorderOptions, RecorderState, SessionSummary};
