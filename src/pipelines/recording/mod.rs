// SPDX-License-Identifier: GPL-3.0-only

//! Recording state machine
//!
//! ```text
//!          start (sensor present and streaming)
//!   Idle ───────────────────────────────────────▶ Active
//!    ▲                                              │
//!    └──────── stop / sensor detached ──────────────┘
//! ```
//!
//! Starting creates `<root>/<label>_<yyyyMMdd_HHmmss>/`, resets the frame
//! counter and subscribes one handler per stream. Stopping clears the active
//! flag and unsubscribes both handlers; writes already handed to the
//! dispatcher still complete and nothing on disk is cleaned up.

mod session;

pub use session::{FrameCounter, RecordingSession, SessionStats, StatsSnapshot};

use crate::backends::sensor::{FrameHandle, Sensor, SensorStatus, StreamKind, Subscription};
use crate::config::{Config, CounterMode};
use crate::errors::{AppResult, RecordingError, SensorError};
use crate::media::DepthConversion;
use crate::pipelines::dispatch::FrameDispatcher;
use crate::storage::{create_session_dir, sanitize_label};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Recorder settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecorderOptions {
    pub recordings_root: PathBuf,
    pub default_label: String,
    pub counter_mode: CounterMode,
    pub depth_conversion: DepthConversion,
}

impl RecorderOptions {
    pub fn new(recordings_root: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            recordings_root: recordings_root.into(),
            default_label: defaults.default_label,
            counter_mode: defaults.counter_mode,
            depth_conversion: defaults.depth_conversion,
        }
    }
}

impl From<&Config> for RecorderOptions {
    fn from(config: &Config) -> Self {
        Self {
            recordings_root: config.recordings_root(),
            default_label: config.default_label.clone(),
            counter_mode: config.counter_mode,
            depth_conversion: config.depth_conversion,
        }
    }
}

/// Recorder state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Active,
}

/// Result of stopping a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub id: Uuid,
    pub directory: PathBuf,
    pub stats: StatsSnapshot,
    /// Writes still queued when the session stopped
    pub pending_writes: usize,
}

struct ActiveSession {
    session: Arc<RecordingSession>,
    sensor: Arc<dyn Sensor>,
    subscriptions: Vec<Subscription>,
}

/// Owns at most one active [`RecordingSession`]
pub struct Recorder {
    options: RecorderOptions,
    dispatcher: Arc<dyn FrameDispatcher>,
    sensor: Option<Arc<dyn Sensor>>,
    active: Option<ActiveSession>,
}

impl Recorder {
    pub fn new(options: RecorderOptions, dispatcher: Arc<dyn FrameDispatcher>) -> Self {
        Self {
            options,
            dispatcher,
            sensor: None,
            active: None,
        }
    }

    pub fn options(&self) -> &RecorderOptions {
        &self.options
    }

    pub fn state(&self) -> RecorderState {
        if self.active.is_some() {
            RecorderState::Active
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Start is offered only while idle with a sensor attached
    pub fn can_start(&self) -> bool {
        self.active.is_none() && self.sensor.is_some()
    }

    /// Stop is offered only while recording
    pub fn can_stop(&self) -> bool {
        self.active.is_some()
    }

    /// The active session, if any
    pub fn session(&self) -> Option<&Arc<RecordingSession>> {
        self.active.as_ref().map(|a| &a.session)
    }

    /// Attach the sensor runtime (connect notification)
    pub fn attach_sensor(&mut self, sensor: Arc<dyn Sensor>) {
        info!(sensor = sensor.name(), status = ?sensor.status(), "Sensor attached");
        self.sensor = Some(sensor);
    }

    /// Forget the sensor; an active session is stopped
    pub fn detach_sensor(&mut self) -> Option<SessionSummary> {
        let sensor = self.sensor.take()?;
        info!(sensor = sensor.name(), "Sensor detached");
        if self.active.is_some() {
            warn!("Sensor lost while recording, stopping session");
            return self.stop();
        }
        None
    }

    /// Sensor status notification
    ///
    /// A disconnect while recording is only logged: frame events stop
    /// arriving and the session stays active until [`Recorder::stop`].
    pub fn on_sensor_status(&mut self, status: SensorStatus) {
        match (status, self.session()) {
            (SensorStatus::Disconnected, Some(session)) => {
                warn!(
                    session = %session.id(),
                    "Sensor disconnected while recording, session stays active"
                );
            }
            (status, _) => debug!(?status, "Sensor status changed"),
        }
    }

    /// Idle → Active
    ///
    /// Fails without touching the filesystem when no sensor is attached, the
    /// sensor is not streaming or a stream is disabled.
    pub fn start(&mut self, label: Option<&str>) -> AppResult<PathBuf> {
        if self.active.is_some() {
            return Err(RecordingError::AlreadyRecording.into());
        }

        let sensor = self.sensor.clone().ok_or(SensorError::NotPresent)?;
        let status = sensor.status();
        if !status.is_running() {
            return Err(
                SensorError::NotReady(format!("{} is {:?}", sensor.name(), status)).into(),
            );
        }
        if let Some(kind) = StreamKind::ALL
            .into_iter()
            .find(|&kind| !sensor.is_stream_enabled(kind))
        {
            return Err(SensorError::NotReady(format!("{} stream is disabled", kind)).into());
        }

        let label = sanitize_label(label, &self.options.default_label);
        let directory =
            create_session_dir(&self.options.recordings_root, &label, &chrono::Local::now())?;

        let session = Arc::new(RecordingSession::new(
            directory.clone(),
            self.options.counter_mode,
            self.options.depth_conversion,
        ));

        let subscriptions = StreamKind::ALL
            .into_iter()
            .map(|kind| {
                let session = Arc::clone(&session);
                let dispatcher = Arc::clone(&self.dispatcher);
                sensor.events().subscribe(
                    kind,
                    Box::new(move |frame: Option<FrameHandle<'_>>| {
                        session.handle_frame(kind, frame, &*dispatcher);
                    }),
                )
            })
            .collect();

        info!(
            session = %session.id(),
            sensor = sensor.name(),
            directory = %directory.display(),
            counter_mode = ?self.options.counter_mode,
            "Recording started"
        );

        self.active = Some(ActiveSession {
            session,
            sensor,
            subscriptions,
        });

        Ok(directory)
    }

    /// Active → Idle; a no-op returning `None` while idle
    pub fn stop(&mut self) -> Option<SessionSummary> {
        let Some(active) = self.active.take() else {
            debug!("Stop requested while idle");
            return None;
        };

        active.session.deactivate();
        for subscription in active.subscriptions {
            active.sensor.events().unsubscribe(subscription);
        }

        let summary = SessionSummary {
            id: active.session.id(),
            directory: active.session.directory().to_path_buf(),
            stats: active.session.stats(),
            pending_writes: self.dispatcher.pending(),
        };

        info!(
            session = %summary.id,
            directory = %summary.directory.display(),
            color = summary.stats.color_written,
            depth = summary.stats.depth_written,
            pending = summary.pending_writes,
            "Recording stopped"
        );

        Some(summary)
    }
}

impl Drop for Recorder {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Recorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recorder")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish()
    }
}
