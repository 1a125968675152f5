// SPDX-License-Identifier: GPL-3.0-only

//! Copies pixel data out of sensor-owned frame buffers

use super::types::{FrameHandle, RawFrame};
use tracing::trace;

/// Copy a borrowed frame into an owned buffer
///
/// The handle is taken by value and dropped before returning, so nothing
/// borrowed from the sensor survives the callback. `None` means the stream
/// produced no frame this cycle and yields `None` as well.
pub fn copy_frame(frame: Option<FrameHandle<'_>>) -> Option<RawFrame> {
    let frame = frame?;

    let mut data = vec![0u8; frame.payload_len()];
    frame.copy_pixel_data_to(&mut data);

    trace!(
        kind = %frame.kind(),
        width = frame.width(),
        height = frame.height(),
        bytes = data.len(),
        "Copied frame payload"
    );

    Some(RawFrame {
        kind: frame.kind(),
        width: frame.width(),
        height: frame.height(),
        data,
    })
}
