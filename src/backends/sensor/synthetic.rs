// SPDX-License-Identifier: GPL-3.0-only

//! Software sensor producing generated color and depth frames
//!
//! Used by the CLI when no hardware is attached and by the tests. Frames
//! follow the hardware layout: color is packed B, G, R, unused and depth is
//! a signed 16-bit sample per pixel holding `millimeters << 3` with a
//! player index in the low three bits.

use super::events::FrameEvents;
use super::types::{FrameHandle, SensorStatus, StreamKind};
use super::Sensor;
use crate::constants::synthetic::{DEPTH_FAR_MM, DEPTH_NEAR_MM};
use crate::constants::COLOR_BYTES_PER_PIXEL;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info};

/// Generated frame source implementing [`Sensor`]
pub struct SyntheticSensor {
    name: String,
    width: u32,
    height: u32,
    status: Mutex<SensorStatus>,
    color_enabled: AtomicBool,
    depth_enabled: AtomicBool,
    events: FrameEvents,
    frame_number: AtomicU64,
    // Sensor-owned buffers, overwritten on every frame
    color_buffer: Mutex<Vec<u8>>,
    depth_buffer: Mutex<Vec<i16>>,
}

impl SyntheticSensor {
    /// Create a connected, streaming sensor with both streams enabled
    pub fn new(width: u32, height: u32) -> Self {
        let pixels = width as usize * height as usize;
        info!(width, height, "Creating synthetic sensor");

        Self {
            name: format!("Synthetic sensor {}x{}", width, height),
            width,
            height,
            status: Mutex::new(SensorStatus::Connected),
            color_enabled: AtomicBool::new(true),
            depth_enabled: AtomicBool::new(true),
            events: FrameEvents::new(),
            frame_number: AtomicU64::new(0),
            color_buffer: Mutex::new(vec![0; pixels * COLOR_BYTES_PER_PIXEL]),
            depth_buffer: Mutex::new(vec![0; pixels]),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_status(&self, status: SensorStatus) {
        debug!(?status, "Synthetic sensor status changed");
        *self.status.lock().unwrap_or_else(|p| p.into_inner()) = status;
    }

    pub fn set_stream_enabled(&self, kind: StreamKind, enabled: bool) {
        match kind {
            StreamKind::Color => self.color_enabled.store(enabled, Ordering::SeqCst),
            StreamKind::Depth => self.depth_enabled.store(enabled, Ordering::SeqCst),
        }
    }

    /// Produce one color and one depth frame, in that order
    pub fn tick(&self) {
        self.emit_color();
        self.emit_depth();
        self.frame_number.fetch_add(1, Ordering::SeqCst);
    }

    /// Fire a color frame-ready event with a generated frame
    pub fn emit_color(&self) {
        if !self.is_streaming(StreamKind::Color) {
            return;
        }
        let frame_number = self.frame_number.load(Ordering::SeqCst);
        let mut buffer = self.color_buffer.lock().unwrap_or_else(|p| p.into_inner());
        fill_color(&mut buffer, self.width, self.height, frame_number);
        self.events.emit(
            StreamKind::Color,
            Some(FrameHandle::new(
                StreamKind::Color,
                self.width,
                self.height,
                buffer.as_slice(),
            )),
        );
    }

    /// Fire a depth frame-ready event with a generated frame
    pub fn emit_depth(&self) {
        if !self.is_streaming(StreamKind::Depth) {
            return;
        }
        let frame_number = self.frame_number.load(Ordering::SeqCst);
        let mut buffer = self.depth_buffer.lock().unwrap_or_else(|p| p.into_inner());
        fill_depth(&mut buffer, self.width, self.height, frame_number);
        self.events.emit(
            StreamKind::Depth,
            Some(FrameHandle::new(
                StreamKind::Depth,
                self.width,
                self.height,
                bytemuck::cast_slice::<i16, u8>(buffer.as_slice()),
            )),
        );
    }

    /// Fire a frame-ready event whose frame was already gone
    pub fn emit_dropped(&self, kind: StreamKind) {
        self.events.emit(kind, None);
    }

    fn is_streaming(&self, kind: StreamKind) -> bool {
        self.status().is_running() && self.is_stream_enabled(kind)
    }
}

impl Sensor for SyntheticSensor {
    fn name(&self) -> &str {
        &self.name
    }

    fn status(&self) -> SensorStatus {
        *self.status.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn is_stream_enabled(&self, kind: StreamKind) -> bool {
        match kind {
            StreamKind::Color => self.color_enabled.load(Ordering::SeqCst),
            StreamKind::Depth => self.depth_enabled.load(Ordering::SeqCst),
        }
    }

    fn events(&self) -> &FrameEvents {
        &self.events
    }
}

/// Horizontal blue ramp, vertical green ramp, red follows the frame number
fn fill_color(buffer: &mut [u8], width: u32, height: u32, frame_number: u64) {
    let w = width.max(1) as usize;
    let h = height.max(1) as usize;
    let red = (frame_number % 256) as u8;

    for (i, px) in buffer.chunks_exact_mut(COLOR_BYTES_PER_PIXEL).enumerate() {
        let x = i % w;
        let y = i / w;
        px[0] = (x * 255 / w) as u8;
        px[1] = (y * 255 / h) as u8;
        px[2] = red;
        px[3] = 0;
    }
}

/// Depth ramp from near to far across the frame with a tracked player in the middle
fn fill_depth(buffer: &mut [i16], width: u32, height: u32, frame_number: u64) {
    let w = width.max(1) as usize;
    let h = height.max(1) as usize;
    let span = u64::from(DEPTH_FAR_MM - DEPTH_NEAR_MM);
    let shift = (frame_number * 10) % span;

    for (i, sample) in buffer.iter_mut().enumerate() {
        let x = i % w;
        let y = i / w;
        let offset = (x as u64 * span / w as u64 + shift) % span;
        let mm = DEPTH_NEAR_MM + offset as u16;

        let in_player = x >= w / 3 && x < 2 * w / 3 && y >= h / 3 && y < 2 * h / 3;
        let player: u16 = if in_player { 1 } else { 0 };

        *sample = ((mm << 3) | player) as i16;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sensor::copy_frame;
    use std::sync::Arc;

    #[test]
    fn test_tick_emits_color_then_depth() {
        let sensor = SyntheticSensor::new(4, 2);
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut subs = Vec::new();
        for kind in StreamKind::ALL {
            let order = Arc::clone(&order);
            subs.push(sensor.events().subscribe(
                kind,
                Box::new(move |frame: Option<FrameHandle<'_>>| {
                    let raw = copy_frame(frame).unwrap();
                    assert_eq!(Some(raw.data.len()), raw.expected_len());
                    order.lock().unwrap().push(raw.kind);
                }),
            ));
        }

        sensor.tick();
        assert_eq!(
            *order.lock().unwrap(),
            vec![StreamKind::Color, StreamKind::Depth]
        );

        for sub in subs {
            assert!(sensor.events().unsubscribe(sub));
        }
    }

    #[test]
    fn test_depth_samples_carry_tracking_bits() {
        let mut buffer = vec![0i16; 9];
        fill_depth(&mut buffer, 3, 3, 0);

        // Centre pixel is inside the player region
        assert_eq!(buffer[4] & 0b111, 1);
        assert_eq!(buffer[0] & 0b111, 0);
        assert_eq!((buffer[0] as u16) >> 3, DEPTH_NEAR_MM);
    }

    #[test]
    fn test_disabled_stream_emits_nothing() {
        let sensor = SyntheticSensor::new(2, 2);
        sensor.set_stream_enabled(StreamKind::Color, false);
        let hits = Arc::new(Mutex::new(0usize));
        let hits_clone = Arc::clone(&hits);
        let sub = sensor.events().subscribe(
            StreamKind::Color,
            Box::new(move |_frame: Option<FrameHandle<'_>>| {
                *hits_clone.lock().unwrap() += 1;
            }),
        );

        sensor.tick();
        assert_eq!(*hits.lock().unwrap(), 0);
        assert!(sensor.events().unsubscribe(sub));
    }
}
