//! Frame-rate setting as typed by the user or stored in a project file.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Frame rate used when nothing else is configured.
pub const DEFAULT_FPS: u32 = 5;

/// Tick delay used when the fps setting is not a positive number.
pub const FALLBACK_FRAME_DELAY: Duration = Duration::from_millis(500);

/// A frame rate that may be a JSON number or free text.
///
/// The raw form is kept so a project file writes back what it read.
/// Interpretation happens on every read via [`FpsSetting::value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FpsSetting {
    Number(serde_json::Number),
    Text(String),
}

impl FpsSetting {
    pub fn text(raw: impl Into<String>) -> Self {
        Self::Text(raw.into())
    }

    /// Positive finite frame rate, or `None` when the setting is unusable.
    pub fn value(&self) -> Option<f64> {
        let fps = match self {
            Self::Number(n) => n.as_f64()?,
            Self::Text(t) => t.trim().parse::<f64>().ok()?,
        };
        (fps.is_finite() && fps > 0.0).then_some(fps)
    }

    /// Time between playback ticks.
    pub fn frame_delay(&self) -> Duration {
        self.value()
            .and_then(|fps| Duration::try_from_secs_f64(1.0 / fps).ok())
            .unwrap_or(FALLBACK_FRAME_DELAY)
    }
}

impl Default for FpsSetting {
    fn default() -> Self {
        Self::Number(DEFAULT_FPS.into())
    }
}

impl From<u32> for FpsSetting {
    fn from(fps: u32) -> Self {
        Self::Number(fps.into())
    }
}

impl fmt::Display for FpsSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(t) => f.write_str(t),
        }
    }
}
