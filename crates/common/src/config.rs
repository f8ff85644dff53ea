//! Application configuration.
//!
//! This is the per-user settings file, distinct from the per-session
//! project file that carries pane patterns.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory preselected when the viewer starts.
    #[serde(default = "default_base_dir")]
    pub initial_base_dir: PathBuf,

    /// Default viewer settings.
    #[serde(default)]
    pub defaults: ViewerDefaults,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Default viewer parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerDefaults {
    /// Playback and export frame rate.
    pub fps: u32,

    /// Initial pane layout, `RxC`.
    pub layout: String,

    /// Preview/export canvas width in pixels.
    pub canvas_width: u32,

    /// Preview/export canvas height in pixels.
    pub canvas_height: u32,

    /// Fourcc tag handed to the video encoder.
    pub video_fourcc: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "paneview=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_base_dir: default_base_dir(),
            defaults: ViewerDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ViewerDefaults {
    fn default() -> Self {
        Self {
            fps: 5,
            layout: "1x1".to_string(),
            canvas_width: 1000,
            canvas_height: 700,
            video_fourcc: "mp4v".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("paneview").join("config.json")
}

/// Home directory, or empty when `HOME` is unset.
fn default_base_dir() -> PathBuf {
    std::env::var("HOME").map(PathBuf::from).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.defaults.fps, 5);
        assert_eq!(config.defaults.layout, "1x1");
        assert_eq!(config.defaults.video_fourcc, "mp4v");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let parsed: AppConfig =
            serde_json::from_str(r#"{"initial_base_dir": "/data"}"#).unwrap();
        assert_eq!(parsed.initial_base_dir, PathBuf::from("/data"));
        assert_eq!(parsed.defaults.canvas_width, 1000);
        assert!(!parsed.logging.json);
    }
}
