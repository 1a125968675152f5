// SPDX-License-Identifier: MPL-2.0

//! Error types for the recorder

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Sensor-related errors
    Sensor(SensorError),
    /// Recording session errors
    Recording(RecordingError),
    /// Per-frame conversion/encoding errors
    Frame(FrameError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Sensor precondition errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// No sensor attached to the recorder
    NotPresent,
    /// Sensor attached but not streaming (or a required stream is disabled)
    NotReady(String),
}

/// Recording session errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingError {
    /// A session is already active
    AlreadyRecording,
    /// The output directory could not be created
    DirectoryFailed(String),
}

/// Errors for a single frame on its way to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Frame reports a zero width or height
    EmptyFrame,
    /// Payload length does not match the reported dimensions
    SizeMismatch { expected: usize, actual: usize },
    /// Reported dimensions do not fit in memory
    TooLarge { width: u32, height: u32 },
    /// Image encoding failed
    EncodingFailed(String),
    /// Writing the encoded file failed
    WriteFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Sensor(e) => write!(f, "Sensor error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Frame(e) => write!(f, "Frame error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::NotPresent => write!(f, "No sensor present"),
            SensorError::NotReady(msg) => write!(f, "Sensor not ready: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::DirectoryFailed(msg) => {
                write!(f, "Failed to create recording directory: {}", msg)
            }
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::EmptyFrame => write!(f, "Frame has no pixels"),
            FrameError::SizeMismatch { expected, actual } => write!(
                f,
                "Payload size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            FrameError::TooLarge { width, height } => {
                write!(f, "Frame dimensions {}x{} are too large", width, height)
            }
            FrameError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            FrameError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for SensorError {}
impl std::error::Error for RecordingError {}
impl std::error::Error for FrameError {}

impl From<SensorError> for AppError {
    fn from(err: SensorError) -> Self {
        AppError::Sensor(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<FrameError> for AppError {
    fn from(err: FrameError) -> Self {
        AppError::Frame(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<image::ImageError> for FrameError {
    fn from(err: image::ImageError) -> Self {
        FrameError::EncodingFailed(err.to_string())
    }
}

impl From<std::io::Error> for FrameError {
    fn from(err: std::io::Error) -> Self {
        FrameError::WriteFailed(err.to_string())
    }
}
