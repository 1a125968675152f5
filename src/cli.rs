// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Recording from the synthetic sensor
//! - Listing recordings
//! - Showing the effective configuration

use depth_recorder::backends::sensor::SyntheticSensor;
use depth_recorder::constants::synthetic::frame_interval;
use depth_recorder::media::DepthConversion;
use depth_recorder::pipelines::{
    FrameDispatcher, ImmediateDispatcher, Recorder, RecorderOptions, SerialDispatcher,
};
use depth_recorder::storage::list_recordings;
use depth_recorder::{Config, CounterMode, WriteMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Options for `record`
pub struct RecordArgs {
    pub label: Option<String>,
    pub frames: u64,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub output: Option<PathBuf>,
    pub immediate: bool,
    pub per_stream: bool,
    pub clear_tracking_bits: bool,
}

/// Record frames from the synthetic sensor until the frame count is reached or Ctrl+C
pub fn record(args: RecordArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load();
    if let Some(output) = args.output {
        config.recordings_root = Some(output);
    }
    if args.immediate {
        config.write_mode = WriteMode::Immediate;
    }
    if args.per_stream {
        config.counter_mode = CounterMode::PerStream;
    }
    if args.clear_tracking_bits {
        config.depth_conversion = DepthConversion::ClearTrackingBits;
    }

    let dispatcher: Arc<dyn FrameDispatcher> = match config.write_mode {
        WriteMode::Immediate => Arc::new(ImmediateDispatcher),
        WriteMode::Deferred => Arc::new(SerialDispatcher::start("frame-writer")?),
    };

    let sensor = Arc::new(SyntheticSensor::new(args.width, args.height));
    let mut recorder = Recorder::new(RecorderOptions::from(&config), Arc::clone(&dispatcher));
    recorder.attach_sensor(sensor.clone());

    let stop_requested = Arc::new(AtomicBool::new(false));
    let stop_clone = Arc::clone(&stop_requested);
    ctrlc::set_handler(move || stop_clone.store(true, Ordering::SeqCst))?;

    let directory = recorder.start(args.label.as_deref())?;
    let session = recorder.session().cloned();

    println!("Recording to: {}", directory.display());
    println!(
        "Sensor: {}x{} @ {}fps, {} writes",
        args.width,
        args.height,
        args.fps,
        match config.write_mode {
            WriteMode::Immediate => "immediate",
            WriteMode::Deferred => "deferred",
        }
    );
    if args.frames == 0 {
        println!("Press Ctrl+C to stop");
    }

    let interval = frame_interval(args.fps);
    let mut delivered = 0u64;
    while !stop_requested.load(Ordering::SeqCst) && (args.frames == 0 || delivered < args.frames)
    {
        let tick_start = Instant::now();
        sensor.tick();
        delivered += 1;
        std::thread::sleep(interval.saturating_sub(tick_start.elapsed()));
    }
    debug!(delivered, "Frame loop finished");

    let summary = recorder.stop();
    if let Some(summary) = &summary
        && summary.pending_writes > 0
    {
        println!("Finishing {} queued writes...", summary.pending_writes);
    }
    dispatcher.wait_idle();

    if let Some(session) = session {
        let stats = session.stats();
        info!(session = %session.id(), ?stats, "Recording finished");
        println!(
            "Saved {} color and {} depth frames ({} skipped, {} failed)",
            stats.color_written, stats.depth_written, stats.skipped, stats.failed
        );
    }

    Ok(())
}

/// List recordings under the root, newest first
pub fn list(output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let root = output.unwrap_or_else(|| Config::load().recordings_root());

    if !root.is_dir() {
        println!("No recordings found in {}", root.display());
        return Ok(());
    }

    let recordings = list_recordings(&root)?;
    if recordings.is_empty() {
        println!("No recordings found in {}", root.display());
        return Ok(());
    }

    println!("Recordings in {}:", root.display());
    println!();
    for recording in recordings {
        let name = recording
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        println!(
            "  {}  ({} color, {} depth)",
            name, recording.color_frames, recording.depth_frames
        );
    }

    Ok(())
}

/// Print the effective configuration, optionally saving it
pub fn show_config(save: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();
    let path = Config::default_path();

    match &path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!("Recordings root: {}", config.recordings_root().display());
    println!("{}", serde_json::to_string_pretty(&config)?);

    if save {
        config.save()?;
        println!("Saved.");
    }

    Ok(())
}
