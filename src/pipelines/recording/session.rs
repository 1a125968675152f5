// SPDX-License-Identifier: GPL-3.0-only

//! A single recording session: output directory, frame counter and statistics

use crate::backends::sensor::{FrameHandle, RawFrame, StreamKind, copy_frame};
use crate::config::CounterMode;
use crate::media::{DepthConversion, convert_frame};
use crate::pipelines::dispatch::FrameDispatcher;
use crate::pipelines::encoding::FrameEncoder;
use crate::storage::frame_file_name;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, trace};
use uuid::Uuid;

/// Frame index bookkeeping
///
/// In [`CounterMode::Shared`] there is one index: color frames use it as-is
/// and a depth frame advances it after its write attempt. A color frame that
/// arrives twice before the next depth frame therefore reuses the index and
/// overwrites the earlier color file. [`CounterMode::PerStream`] keeps an
/// independent index per stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounter {
    mode: CounterMode,
    shared: u64,
    color: u64,
    depth: u64,
}

impl FrameCounter {
    pub fn new(mode: CounterMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Index the next frame of `kind` is written under
    pub fn index_for(&self, kind: StreamKind) -> u64 {
        match (self.mode, kind) {
            (CounterMode::Shared, _) => self.shared,
            (CounterMode::PerStream, StreamKind::Color) => self.color,
            (CounterMode::PerStream, StreamKind::Depth) => self.depth,
        }
    }

    /// Advance after a frame of `kind` was handed off for writing
    pub fn advance(&mut self, kind: StreamKind) {
        match (self.mode, kind) {
            (CounterMode::Shared, StreamKind::Depth) => self.shared += 1,
            (CounterMode::Shared, StreamKind::Color) => {}
            (CounterMode::PerStream, StreamKind::Color) => self.color += 1,
            (CounterMode::PerStream, StreamKind::Depth) => self.depth += 1,
        }
    }
}

/// Per-session counters, updated from the callback and writer threads
#[derive(Debug, Default)]
pub struct SessionStats {
    color_written: AtomicU64,
    depth_written: AtomicU64,
    skipped: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`SessionStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub color_written: u64,
    pub depth_written: u64,
    /// Frame-ready events that carried no frame
    pub skipped: u64,
    /// Frames whose conversion, encoding or write failed
    pub failed: u64,
}

impl SessionStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            color_written: self.color_written.load(Ordering::SeqCst),
            depth_written: self.depth_written.load(Ordering::SeqCst),
            skipped: self.skipped.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }

    fn record_written(&self, kind: StreamKind) {
        match kind {
            StreamKind::Color => self.color_written.fetch_add(1, Ordering::SeqCst),
            StreamKind::Depth => self.depth_written.fetch_add(1, Ordering::SeqCst),
        };
    }
}

/// State shared between the recorder and its frame handlers
pub struct RecordingSession {
    id: Uuid,
    directory: PathBuf,
    active: AtomicBool,
    counter: Mutex<FrameCounter>,
    stats: SessionStats,
    depth_conversion: DepthConversion,
    encoder: FrameEncoder,
}

impl RecordingSession {
    pub fn new(directory: PathBuf, counter_mode: CounterMode, depth_conversion: DepthConversion) -> Self {
        Self {
            id: Uuid::new_v4(),
            directory,
            active: AtomicBool::new(true),
            counter: Mutex::new(FrameCounter::new(counter_mode)),
            stats: SessionStats::default(),
            depth_conversion,
            encoder: FrameEncoder::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Current counter state
    pub fn counter(&self) -> FrameCounter {
        *self.lock_counter()
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Frame-ready entry point
    ///
    /// Copies the frame on the calling thread, then hands the
    /// convert/encode/write step to `dispatcher`. The counter lock is held
    /// across the hand-off so index assignment stays ordered even if events
    /// arrive from more than one thread.
    pub fn handle_frame(
        self: &Arc<Self>,
        kind: StreamKind,
        frame: Option<FrameHandle<'_>>,
        dispatcher: &dyn FrameDispatcher,
    ) {
        if !self.is_active() {
            trace!(session = %self.id, kind = %kind, "Ignoring frame, session inactive");
            return;
        }

        let Some(raw) = copy_frame(frame) else {
            self.stats.skipped.fetch_add(1, Ordering::SeqCst);
            debug!(session = %self.id, kind = %kind, "No frame available");
            return;
        };

        let mut counter = self.lock_counter();
        let index = counter.index_for(kind);
        let path = self.directory.join(frame_file_name(kind, index));

        let session = Arc::clone(self);
        dispatcher.dispatch(Box::new(move || session.persist(raw, &path)));

        counter.advance(kind);
    }

    /// Convert, encode and write one frame; failures are logged and counted
    fn persist(&self, raw: RawFrame, path: &Path) {
        let kind = raw.kind;
        let result = convert_frame(&raw, self.depth_conversion)
            .and_then(|image| self.encoder.write(&image, path));

        match result {
            Ok(path) => {
                self.stats.record_written(kind);
                debug!(session = %self.id, path = %path.display(), "Frame written");
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    session = %self.id,
                    path = %path.display(),
                    error = %e,
                    "Failed to write frame"
                );
            }
        }
    }

    fn lock_counter(&self) -> std::sync::MutexGuard<'_, FrameCounter> {
        self.counter.lock().unwrap_or_else(|p| p.into_inner())
    }
}

impl std::fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingSession")
            .field("id", &self.id)
            .field("directory", &self.directory)
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipelines::dispatch::ImmediateDispatcher;

    #[test]
    fn test_shared_counter_pairs_color_with_depth() {
        let mut counter = FrameCounter::new(CounterMode::Shared);
        assert_eq!(counter.index_for(StreamKind::Color), 0);
        counter.advance(StreamKind::Color);
        assert_eq!(counter.index_for(StreamKind::Depth), 0);
        counter.advance(StreamKind::Depth);
        assert_eq!(counter.index_for(StreamKind::Color), 1);
        assert_eq!(counter.index_for(StreamKind::Depth), 1);
    }

    #[test]
    fn test_per_stream_counters_are_independent() {
        let mut counter = FrameCounter::new(CounterMode::PerStream);
        counter.advance(StreamKind::Color);
        counter.advance(StreamKind::Color);
        counter.advance(StreamKind::Depth);
        assert_eq!(counter.index_for(StreamKind::Color), 2);
        assert_eq!(counter.index_for(StreamKind::Depth), 1);
    }

    #[test]
    fn test_inactive_session_ignores_frames() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(RecordingSession::new(
            dir.path().to_path_buf(),
            CounterMode::Shared,
            DepthConversion::Narrow,
        ));
        session.deactivate();

        let payload = [0u8; 8];
        session.handle_frame(
            StreamKind::Depth,
            Some(FrameHandle::new(StreamKind::Depth, 2, 2, &payload)),
            &ImmediateDispatcher,
        );

        assert_eq!(session.counter().index_for(StreamKind::Depth), 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_missing_frame_is_skipped_without_advancing() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(RecordingSession::new(
            dir.path().to_path_buf(),
            CounterMode::Shared,
            DepthConversion::Narrow,
        ));

        session.handle_frame(StreamKind::Depth, None, &ImmediateDispatcher);

        assert_eq!(session.stats().skipped, 1);
        assert_eq!(session.counter().index_for(StreamKind::Depth), 0);
    }

    #[test]
    fn test_bad_frame_counts_as_failure_and_advances() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(RecordingSession::new(
            dir.path().to_path_buf(),
            CounterMode::Shared,
            DepthConversion::Narrow,
        ));

        // Declared 2x2 depth but only 3 bytes of payload
        let payload = [0u8; 3];
        session.handle_frame(
            StreamKind::Depth,
            Some(FrameHandle::new(StreamKind::Depth, 2, 2, &payload)),
            &ImmediateDispatcher,
        );

        assert_eq!(session.stats().failed, 1);
        assert_eq!(session.counter().index_for(StreamKind::Depth), 1);
    }
}
