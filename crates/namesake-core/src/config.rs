/// User configuration, read from `<config dir>/namesake/config.toml`.
///
/// Every key is optional; missing keys take their defaults. A missing file is
/// not an error. An unreadable or malformed file is logged and replaced by the
/// defaults so the application always starts.
use crate::cluster::{ClusterEngine, DEFAULT_THRESHOLD};
use crate::consolidate::{ConsolidateOptions, RelocateMode, DEFAULT_MAX_NAME_ATTEMPTS};
use crate::monitor::debounce::DEFAULT_WINDOW;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Path to the user config file, `None` if the platform has no config dir.
pub static CONFIG_PATH: LazyLock<Option<PathBuf>> =
    LazyLock::new(|| Some(dirs::config_dir()?.join("namesake").join("config.toml")));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("similarity_threshold must be within 0.0..=1.0, got {0}")]
    InvalidThreshold(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub similarity_threshold: f64,
    /// Quiet period, in seconds, before change notifications trigger a rescan.
    pub debounce_secs: f64,
    pub mode: RelocateMode,
    /// Forget all exclusions when a full scan starts.
    pub clear_exclusions_on_rescan: bool,
    pub max_name_attempts: usize,
    /// How many item errors a merge result shows before "and N more".
    pub error_preview: usize,
    /// Watch the directory for changes after the first scan.
    pub watch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_THRESHOLD,
            debounce_secs: DEFAULT_WINDOW.as_secs_f64(),
            mode: RelocateMode::Move,
            clear_exclusions_on_rescan: true,
            max_name_attempts: DEFAULT_MAX_NAME_ATTEMPTS,
            error_preview: 3,
            watch: true,
        }
    }
}

impl Config {
    /// Load the user config, falling back to defaults on any problem.
    pub fn load() -> Self {
        let Some(path) = CONFIG_PATH.as_deref() else {
            debug!("No config directory on this platform, using defaults");
            return Self::default();
        };
        match Self::load_from(path) {
            Ok(Some(config)) => config,
            Ok(None) => {
                debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    /// Read and validate `path`. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(Some(config))
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Write the config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |message: String| ConfigError::Write {
            path: path.to_path_buf(),
            message,
        };
        let text = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        std::fs::write(path, text).map_err(|e| write_err(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidThreshold(self.similarity_threshold));
        }
        Ok(())
    }

    pub fn engine(&self) -> ClusterEngine {
        ClusterEngine::new(self.similarity_threshold)
    }

    /// The debounce window. Negative or non-finite values fall back to the
    /// default.
    pub fn debounce_window(&self) -> Duration {
        Duration::try_from_secs_f64(self.debounce_secs).unwrap_or(DEFAULT_WINDOW)
    }

    pub fn consolidate_options(&self) -> ConsolidateOptions {
        ConsolidateOptions {
            max_name_attempts: self.max_name_attempts,
            ..ConsolidateOptions::default()
        }
    }
}
