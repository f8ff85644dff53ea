//! Project state and the saved project file.
//!
//! A project is the base directory, the frame rate, and the pane set.
//! The project file is its JSON form:
//!
//! ```json
//! {
//!   "base_directory": "/data/run42",
//!   "layout": "2x2",
//!   "fps": "5",
//!   "panes": { "0": { "pattern": "images/*.png", "enabled": true } }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use paneview_common::error::PaneviewError;
use serde::{Deserialize, Serialize};

use crate::fps::FpsSetting;
use crate::layout::LayoutSpec;
use crate::pane::PaneSet;

/// Live project state owned by the pane-management layer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Project {
    /// Directory every pane pattern is resolved against.
    pub base_directory: Option<PathBuf>,

    /// Playback and export frame rate.
    pub fps: FpsSetting,

    /// Pane arena and layout.
    pub panes: PaneSet,
}

impl Project {
    pub fn new(layout: LayoutSpec) -> Self {
        Self {
            base_directory: None,
            fps: FpsSetting::default(),
            panes: PaneSet::new(layout),
        }
    }
}

/// On-disk project file.
///
/// Every key is optional on load; a missing key leaves the current value
/// in place when the file is applied.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fps: Option<FpsSetting>,

    /// Per-pane settings keyed by zero-based pane index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panes: Option<BTreeMap<usize, PaneEntry>>,
}

/// Saved settings of one pane.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PaneEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ProjectFile {
    /// Capture the saveable part of a project.
    pub fn capture(project: &Project) -> Self {
        let panes = project
            .panes
            .panes()
            .iter()
            .enumerate()
            .map(|(i, pane)| {
                (
                    i,
                    PaneEntry {
                        pattern: Some(pane.pattern.clone()),
                        enabled: Some(pane.enabled),
                    },
                )
            })
            .collect();

        Self {
            base_directory: Some(
                project
                    .base_directory
                    .as_ref()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_default(),
            ),
            layout: Some(project.panes.layout().to_string()),
            fps: Some(project.fps.clone()),
            panes: Some(panes),
        }
    }

    /// Parse a project file from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ProjectError> {
        let file: Self = serde_json::from_str(json).map_err(|e| ProjectError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Load and validate a project file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: Self = serde_json::from_str(&json).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        file.validate()?;
        tracing::info!(path = %path.display(), "Loaded project file");
        Ok(file)
    }

    /// Write the project file as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self).map_err(|e| ProjectError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| ProjectError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::info!(path = %path.display(), "Saved project file");
        Ok(())
    }

    /// Check everything that could fail during [`ProjectFile::apply`].
    pub fn validate(&self) -> Result<(), ProjectError> {
        if let Some(layout) = &self.layout {
            layout
                .parse::<LayoutSpec>()
                .map_err(|e| ProjectError::ValidationError {
                    message: e.short_message(),
                })?;
        }
        Ok(())
    }

    /// Apply this file to a project.
    ///
    /// Order: base directory, layout (recreating empty pane slots), fps,
    /// then pane fields by index. Indices outside the new layout are
    /// ignored. Nothing is mutated if validation fails. Resolved file
    /// lists are left empty; the caller re-resolves afterwards.
    pub fn apply(&self, project: &mut Project) -> Result<(), ProjectError> {
        self.validate()?;

        if let Some(dir) = &self.base_directory {
            project.base_directory = (!dir.is_empty()).then(|| PathBuf::from(dir));
        }

        if let Some(layout) = &self.layout {
            let layout = layout
                .parse::<LayoutSpec>()
                .map_err(|e| ProjectError::ValidationError {
                    message: e.short_message(),
                })?;
            project.panes.set_layout(layout);
        }

        if let Some(fps) = &self.fps {
            project.fps = fps.clone();
        }

        for (index, entry) in self.panes.iter().flatten() {
            if *index >= project.panes.len() {
                tracing::debug!(index, "Ignoring pane entry outside layout");
                continue;
            }
            if let Some(pattern) = &entry.pattern {
                project.panes.set_pattern(*index, pattern.clone());
            }
            if let Some(enabled) = entry.enabled {
                project.panes.set_enabled(*index, enabled);
            }
        }

        Ok(())
    }
}

/// Errors that can occur when reading or writing project files.
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid project: {message}")]
    ValidationError { message: String },
}

impl From<ProjectError> for PaneviewError {
    fn from(err: ProjectError) -> Self {
        PaneviewError::config(err.to_string())
    }
}
