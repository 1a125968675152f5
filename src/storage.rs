// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for recording directories and frame files

use crate::backends::sensor::StreamKind;
use crate::constants::{
    DEFAULT_RECORDING_LABEL, FRAME_FILE_EXTENSION, FRAME_INDEX_WIDTH, RECORDINGS_DIR_NAME,
    SESSION_TIMESTAMP_FORMAT,
};
use crate::errors::RecordingError;
use chrono::{DateTime, TimeZone};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default root for recordings: `<Videos>/Recordings`, or `~/Recordings`
pub fn default_recordings_root() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(RECORDINGS_DIR_NAME)
}

/// Label with path separators replaced; blank labels use `fallback`
pub fn sanitize_label(label: Option<&str>, fallback: &str) -> String {
    let fallback = if fallback.trim().is_empty() {
        DEFAULT_RECORDING_LABEL
    } else {
        fallback.trim()
    };

    let label = label.map(str::trim).filter(|l| !l.is_empty()).unwrap_or(fallback);
    label
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect()
}

/// `<label>_<yyyyMMdd_HHmmss>`
pub fn session_dir_name<Tz: TimeZone>(label: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{}_{}", label, timestamp.format(SESSION_TIMESTAMP_FORMAT))
}

/// `color_000042.png` / `depth_000042.png`
pub fn frame_file_name(kind: StreamKind, index: u64) -> String {
    format!(
        "{}_{:0width$}.{}",
        kind.file_prefix(),
        index,
        FRAME_FILE_EXTENSION,
        width = FRAME_INDEX_WIDTH
    )
}

/// Create a fresh session directory under `root`
///
/// If a directory with the same label and second already exists, `-1`,
/// `-2`, ... is appended so sessions never share a directory.
pub fn create_session_dir<Tz: TimeZone>(
    root: &Path,
    label: &str,
    timestamp: &DateTime<Tz>,
) -> Result<PathBuf, RecordingError>
where
    Tz::Offset: std::fmt::Display,
{
    std::fs::create_dir_all(root)
        .map_err(|e| RecordingError::DirectoryFailed(format!("{}: {}", root.display(), e)))?;

    let base = session_dir_name(label, timestamp);
    let mut suffix = 0u32;
    loop {
        let name = if suffix == 0 {
            base.clone()
        } else {
            format!("{}-{}", base, suffix)
        };
        let path = root.join(&name);

        match std::fs::create_dir(&path) {
            Ok(()) => {
                info!(path = %path.display(), "Created recording directory");
                return Ok(path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "Recording directory exists, trying next suffix");
                suffix += 1;
            }
            Err(e) => {
                return Err(RecordingError::DirectoryFailed(format!(
                    "{}: {}",
                    path.display(),
                    e
                )));
            }
        }
    }
}

/// Summary of a recording directory on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingInfo {
    pub path: PathBuf,
    pub color_frames: usize,
    pub depth_frames: usize,
}

/// List recording directories under `root`, newest first
pub fn list_recordings(root: &Path) -> std::io::Result<Vec<RecordingInfo>> {
    let mut sessions = Vec::new();
    for entry in std::fs::read_dir(root)?.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let modified = entry.metadata().and_then(|m| m.modified()).ok();
        sessions.push((modified, path));
    }

    sessions.sort_by_key(|(modified, _)| std::cmp::Reverse(*modified));

    Ok(sessions
        .into_iter()
        .map(|(_, path)| {
            let (color_frames, depth_frames) = count_frames(&path);
            RecordingInfo {
                path,
                color_frames,
                depth_frames,
            }
        })
        .collect())
}

fn count_frames(dir: &Path) -> (usize, usize) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return (0, 0);
    };

    let mut color = 0;
    let mut depth = 0;
    for entry in entries.flatten() {
        match frame_kind(&entry.path()) {
            Some(StreamKind::Color) => color += 1,
            Some(StreamKind::Depth) => depth += 1,
            None => {}
        }
    }
    (color, depth)
}

/// Stream of a `<prefix>_<digits>.png` frame file
fn frame_kind(path: &Path) -> Option<StreamKind> {
    if path.extension()? != FRAME_FILE_EXTENSION {
        return None;
    }
    let (prefix, index) = path.file_stem()?.to_str()?.split_once('_')?;
    if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    StreamKind::ALL
        .into_iter()
        .find(|kind| kind.file_prefix() == prefix)
}
