// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{APP_DIR_NAME, CONFIG_FILE_NAME, CONFIG_VERSION, DEFAULT_RECORDING_LABEL};
use crate::errors::{AppError, AppResult};
use crate::media::DepthConversion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// How frame indices are assigned to the two streams
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum CounterMode {
    /// One counter; color frames reuse the current index and only a depth
    /// write advances it, so a color/depth pair from one tick share an index
    #[default]
    Shared,
    /// Each stream numbers its own frames from zero
    PerStream,
}

/// Where the convert/encode/write step runs
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum WriteMode {
    /// On the frame callback thread
    Immediate,
    /// On a single background writer thread, in arrival order
    #[default]
    Deferred,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration format version
    pub version: u32,
    /// Parent directory of all recordings (None = default under the video directory)
    pub recordings_root: Option<PathBuf>,
    /// Label used when the user leaves the recording name blank
    pub default_label: String,
    /// Frame index assignment
    pub counter_mode: CounterMode,
    /// Immediate or deferred writes
    pub write_mode: WriteMode,
    /// Depth sample conversion
    pub depth_conversion: DepthConversion,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            recordings_root: None,
            default_label: DEFAULT_RECORDING_LABEL.to_string(),
            counter_mode: CounterMode::default(),
            write_mode: WriteMode::default(),
            depth_conversion: DepthConversion::default(),
        }
    }
}

impl Config {
    /// `<config_dir>/depth-recorder/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            warn!("No config directory available, using defaults");
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load from a file; a missing file yields defaults
    pub fn load_from(path: &Path) -> AppResult<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(AppError::Config(format!("{}: {}", path.display(), e))),
        };

        let mut config: Config = serde_json::from_str(&contents)?;
        if config.version != CONFIG_VERSION {
            info!(
                from = config.version,
                to = CONFIG_VERSION,
                "Migrating config version"
            );
            config.version = CONFIG_VERSION;
        }
        Ok(config)
    }

    /// Save to the default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::default_path()
            .ok_or_else(|| AppError::Config("No config directory available".to_string()))?;
        self.save_to(&path)
    }

    /// Save as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Effective recordings root
    pub fn recordings_root(&self) -> PathBuf {
        self.recordings_root
            .clone()
            .unwrap_or_else(crate::storage::default_recordings_root)
    }
}
