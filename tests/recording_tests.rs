// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the recording state machine

use depth_recorder::backends::sensor::{
    FrameHandle, Sensor, SensorStatus, StreamKind, SyntheticSensor,
};
use depth_recorder::errors::{AppError, RecordingError, SensorError};
use depth_recorder::pipelines::{
    FrameDispatcher, ImmediateDispatcher, Recorder, RecorderOptions, RecorderState,
    SerialDispatcher,
};
use depth_recorder::CounterMode;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn frame_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .flatten()
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn recorder_with_sensor(root: &TempDir) -> (Recorder, Arc<SyntheticSensor>) {
    let sensor = Arc::new(SyntheticSensor::new(8, 6));
    let mut recorder = Recorder::new(
        RecorderOptions::new(root.path().join("recordings")),
        Arc::new(ImmediateDispatcher),
    );
    recorder.attach_sensor(sensor.clone());
    (recorder, sensor)
}

#[test]
fn test_three_depth_frames_end_to_end() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(Some("Test")).unwrap();
    for _ in 0..3 {
        sensor.emit_depth();
    }
    let summary = recorder.stop().unwrap();

    let name = dir.file_name().unwrap().to_string_lossy().into_owned();
    let timestamp = name.strip_prefix("Test_").expect("label prefix");
    assert_eq!(timestamp.len(), "yyyyMMdd_HHmmss".len());
    assert!(timestamp.chars().all(|c| c.is_ascii_digit() || c == '_'));

    assert_eq!(
        frame_files(&dir),
        vec!["depth_000000.png", "depth_000001.png", "depth_000002.png"]
    );
    assert_eq!(summary.stats.depth_written, 3);
    assert_eq!(summary.directory, dir);
}

#[test]
fn test_depth_png_keeps_raw_bit_pattern() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(None).unwrap();
    sensor.emit_depth();
    recorder.stop();

    let image = image::open(dir.join("depth_000000.png")).unwrap().to_luma16();
    assert_eq!(image.dimensions(), (8, 6));
    // Centre pixel carries the player index in the low bits
    let centre = image.get_pixel(4, 3)[0];
    assert_eq!(centre & 0b111, 1);
}

#[test]
fn test_default_label_is_used_when_blank() {
    let root = TempDir::new().unwrap();
    let (mut recorder, _sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(Some("  ")).unwrap();
    assert!(
        dir.file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("Recording_")
    );
}

#[test]
fn test_start_without_sensor_fails_cleanly() {
    let root = TempDir::new().unwrap();
    let recordings = root.path().join("recordings");
    let mut recorder = Recorder::new(
        RecorderOptions::new(&recordings),
        Arc::new(ImmediateDispatcher),
    );

    let result = recorder.start(Some("Test"));

    assert_eq!(result, Err(AppError::Sensor(SensorError::NotPresent)));
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(!recordings.exists());
    assert!(!recorder.can_start());
}

#[test]
fn test_start_requires_running_sensor_and_streams() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    sensor.set_status(SensorStatus::Initializing);
    assert!(matches!(
        recorder.start(None),
        Err(AppError::Sensor(SensorError::NotReady(_)))
    ));

    sensor.set_status(SensorStatus::Connected);
    sensor.set_stream_enabled(StreamKind::Depth, false);
    assert!(matches!(
        recorder.start(None),
        Err(AppError::Sensor(SensorError::NotReady(_)))
    ));

    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(!root.path().join("recordings").exists());
}

#[test]
fn test_stop_while_idle_is_a_no_op() {
    let root = TempDir::new().unwrap();
    let (mut recorder, _sensor) = recorder_with_sensor(&root);

    assert!(recorder.stop().is_none());
    assert!(recorder.stop().is_none());
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(!root.path().join("recordings").exists());
}

#[test]
fn test_start_twice_is_rejected() {
    let root = TempDir::new().unwrap();
    let (mut recorder, _sensor) = recorder_with_sensor(&root);

    recorder.start(None).unwrap();
    assert!(!recorder.can_start());
    assert!(recorder.can_stop());
    assert_eq!(
        recorder.start(None),
        Err(AppError::Recording(RecordingError::AlreadyRecording))
    );
}

#[test]
fn test_stop_leaves_no_subscriptions() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    recorder.start(None).unwrap();
    assert_eq!(sensor.events().subscriber_count_for(StreamKind::Color), 1);
    assert_eq!(sensor.events().subscriber_count_for(StreamKind::Depth), 1);

    let dir = recorder.stop().unwrap().directory;
    assert_eq!(sensor.events().subscriber_count(), 0);

    // Events keep firing but nothing is written
    sensor.tick();
    assert!(frame_files(&dir).is_empty());
}

#[test]
fn test_drop_unsubscribes() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);
    recorder.start(None).unwrap();

    drop(recorder);
    assert_eq!(sensor.events().subscriber_count(), 0);
}

#[test]
fn test_new_session_resets_counter() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let first = recorder.start(Some("Test")).unwrap();
    sensor.emit_depth();
    sensor.emit_depth();
    recorder.stop();

    let second = recorder.start(Some("Test")).unwrap();
    sensor.emit_depth();
    recorder.stop();

    assert_ne!(first, second);
    assert_eq!(frame_files(&first).len(), 2);
    assert_eq!(frame_files(&second), vec!["depth_000000.png"]);
}

#[test]
fn test_shared_counter_pairs_color_and_depth() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(None).unwrap();
    for _ in 0..3 {
        sensor.tick();
    }
    // A second color frame before the next depth frame reuses index 3
    sensor.emit_color();
    sensor.emit_color();
    let summary = recorder.stop().unwrap();

    assert_eq!(
        frame_files(&dir),
        vec![
            "color_000000.png",
            "color_000001.png",
            "color_000002.png",
            "color_000003.png",
            "depth_000000.png",
            "depth_000001.png",
            "depth_000002.png",
        ]
    );
    assert_eq!(summary.stats.color_written, 5);
}

#[test]
fn test_per_stream_counters() {
    let root = TempDir::new().unwrap();
    let sensor = Arc::new(SyntheticSensor::new(4, 4));
    let mut options = RecorderOptions::new(root.path());
    options.counter_mode = CounterMode::PerStream;
    let mut recorder = Recorder::new(options, Arc::new(ImmediateDispatcher));
    recorder.attach_sensor(sensor.clone());

    let dir = recorder.start(None).unwrap();
    sensor.emit_color();
    sensor.emit_color();
    sensor.emit_depth();
    recorder.stop();

    assert_eq!(
        frame_files(&dir),
        vec!["color_000000.png", "color_000001.png", "depth_000000.png"]
    );
}

#[test]
fn test_dropped_frames_are_skipped() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(None).unwrap();
    sensor.emit_dropped(StreamKind::Depth);
    sensor.emit_depth();
    let summary = recorder.stop().unwrap();

    assert_eq!(summary.stats.skipped, 1);
    assert_eq!(frame_files(&dir), vec!["depth_000000.png"]);
}

#[test]
fn test_write_failure_does_not_stop_session() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    let dir = recorder.start(None).unwrap();
    std::fs::remove_dir_all(&dir).unwrap();
    sensor.emit_depth();
    assert!(recorder.is_recording());

    std::fs::create_dir(&dir).unwrap();
    sensor.emit_depth();
    let summary = recorder.stop().unwrap();

    assert_eq!(summary.stats.failed, 1);
    assert_eq!(summary.stats.depth_written, 1);
    // The failed frame still consumed its index
    assert_eq!(frame_files(&dir), vec!["depth_000001.png"]);
}

#[test]
fn test_deferred_writes_complete_after_stop() {
    let root = TempDir::new().unwrap();
    let sensor = Arc::new(SyntheticSensor::new(8, 6));
    let dispatcher = Arc::new(SerialDispatcher::start("test-writer").unwrap());
    let mut recorder = Recorder::new(
        RecorderOptions::new(root.path()),
        dispatcher.clone(),
    );
    recorder.attach_sensor(sensor.clone());

    // Hold the writer so every frame is still queued at stop
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    dispatcher.dispatch(Box::new(move || {
        let _ = release_rx.recv();
    }));

    let dir = recorder.start(Some("Deferred")).unwrap();
    for _ in 0..4 {
        sensor.tick();
    }
    let summary = recorder.stop().unwrap();
    assert!(summary.pending_writes >= 8);
    assert_eq!(summary.stats.depth_written, 0);

    release_tx.send(()).unwrap();
    dispatcher.wait_idle();

    let files = frame_files(&dir);
    assert_eq!(files.len(), 8);
    assert_eq!(files[0], "color_000000.png");
    assert_eq!(files[7], "depth_000003.png");
}

#[test]
fn test_oversized_frame_fails_alone_on_writer_thread() {
    let root = TempDir::new().unwrap();
    let sensor = Arc::new(SyntheticSensor::new(8, 6));
    let dispatcher = Arc::new(SerialDispatcher::start("test-writer").unwrap());
    let writer_thread = {
        let id = Arc::new(std::sync::Mutex::new(None));
        let id_clone = Arc::clone(&id);
        dispatcher.dispatch(Box::new(move || {
            *id_clone.lock().unwrap() = Some(std::thread::current().id());
        }));
        dispatcher.wait_idle();
        id.lock().unwrap().take().unwrap()
    };
    let mut recorder = Recorder::new(RecorderOptions::new(root.path()), dispatcher.clone());
    recorder.attach_sensor(sensor.clone());

    let dir = recorder.start(Some("Oversized")).unwrap();
    let payload = [0u8; 4];
    sensor.events().emit(
        StreamKind::Color,
        Some(FrameHandle::new(StreamKind::Color, u32::MAX, u32::MAX, &payload)),
    );
    sensor.emit_depth();
    dispatcher.wait_idle();

    // The writer thread survived and handled the depth frame
    let (tx, rx) = std::sync::mpsc::channel();
    dispatcher.dispatch(Box::new(move || {
        let _ = tx.send(std::thread::current().id());
    }));
    assert_eq!(rx.recv().unwrap(), writer_thread);
    dispatcher.wait_idle();

    let summary = recorder.stop().unwrap();
    assert_eq!(summary.stats.failed, 1);
    assert_eq!(summary.stats.color_written, 0);
    assert_eq!(summary.stats.depth_written, 1);
    assert_eq!(summary.pending_writes, 0);
    assert_eq!(frame_files(&dir), vec!["depth_000000.png"]);
}

#[test]
fn test_disconnect_keeps_session_active_until_detached() {
    let root = TempDir::new().unwrap();
    let (mut recorder, sensor) = recorder_with_sensor(&root);

    recorder.start(None).unwrap();
    sensor.set_status(SensorStatus::Disconnected);
    recorder.on_sensor_status(SensorStatus::Disconnected);
    assert_eq!(recorder.state(), RecorderState::Active);

    let summary = recorder.detach_sensor();
    assert!(summary.is_some());
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert_eq!(sensor.events().subscriber_count(), 0);
}
