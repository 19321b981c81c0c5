//! Optional configuration file for the feedback panel.
//!
//! Read from `~/.config/image-feedback/config.toml` (platform equivalent via
//! `dirs`). Every field has a default, so a missing file is not an error.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::imaging::Dimensions;

const APP_DIR: &str = "image-feedback";

/// Top-level configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Image service settings.
    pub api: ApiConfig,
    /// Panel presentation settings.
    pub display: DisplayConfig,
    /// Feedback journal settings.
    pub journal: JournalConfig,
}

/// Image service configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the service, without the `/api` prefix.
    pub base_url: String,
    /// Number of images requested per session.
    pub image_count: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://mersadesalati.pythonanywhere.com".to_string(),
            image_count: 3,
        }
    }
}

/// Panel presentation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Initial width of the image area in pixels.
    pub frame_width: u32,
    /// Initial height of the image area in pixels.
    pub frame_height: u32,
    /// Greeting shown above the start button.
    pub welcome: String,
    /// Question shown above the rating slider.
    pub prompt: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            frame_width: 480,
            frame_height: 480,
            welcome: "Welcome! Please provide your feedback on the images.".to_string(),
            prompt: "How beautiful is the animal?".to_string(),
        }
    }
}

impl DisplayConfig {
    pub fn frame(&self) -> Dimensions {
        Dimensions::new(self.frame_width, self.frame_height)
    }
}

/// Feedback journal configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Append each rating to `feedback.txt`.
    pub enabled: bool,
    /// Directory holding `feedback.txt`; defaults to the app's log directory.
    pub dir: Option<PathBuf>,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl JournalConfig {
    /// Where the journal lives, if it is enabled and a location is known.
    pub fn log_dir(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }
        self.dir.clone().or_else(default_log_dir)
    }
}

impl AppConfig {
    /// Load the user config, falling back to defaults.
    ///
    /// Missing files are silently ignored. Invalid files are logged as warnings.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            debug!("no config directory on this platform");
            return Self::default();
        };

        if !path.exists() {
            debug!("config not found: {}", path.display());
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                info!("Loaded config: {}", path.display());
                config
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }

    /// Read and parse one config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Get the config file path.
fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Default directory for the feedback journal.
fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join(APP_DIR).join("logs"))
}
