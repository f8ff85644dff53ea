//! Pane-management layer.
//!
//! The workspace owns the [`Project`] and keeps every pane's resolved
//! files and status in step with its pattern, its enabled flag, and the
//! base directory. UI code calls these methods instead of writing pane
//! fields directly.

use std::fmt;
use std::path::{Path, PathBuf};

use paneview_common::error::PaneviewResult;
use paneview_project_model::{
    FpsSetting, LayoutSpec, PaneSet, PaneState, Project, ProjectFile,
};

use crate::matcher::resolve;

/// Outcome of the last resolution of one pane.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PaneStatus {
    /// Not resolved yet (no base directory, or freshly created).
    #[default]
    Unresolved,
    /// Resolved to this many files.
    Matched(usize),
    /// Pane is disabled.
    Disabled,
    /// Pattern could not be used.
    Error(String),
}

impl fmt::Display for PaneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => f.write_str("Files: 0"),
            Self::Matched(n) => write!(f, "Files: {n}"),
            Self::Disabled => f.write_str("Files: 0 (disabled)"),
            Self::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Project plus per-pane resolution status.
#[derive(Debug, Clone)]
pub struct Workspace {
    project: Project,
    statuses: Vec<PaneStatus>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(LayoutSpec::SINGLE)
    }
}

impl Workspace {
    pub fn new(layout: LayoutSpec) -> Self {
        Self::from_project(Project::new(layout))
    }

    /// Wrap an existing project and resolve it.
    pub fn from_project(project: Project) -> Self {
        let mut workspace = Self {
            statuses: vec![PaneStatus::Unresolved; project.panes.len()],
            project,
        };
        workspace.refresh_all();
        workspace
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn panes(&self) -> &PaneSet {
        &self.project.panes
    }

    pub fn layout(&self) -> LayoutSpec {
        self.project.panes.layout()
    }

    pub fn base_directory(&self) -> Option<&Path> {
        self.project.base_directory.as_deref()
    }

    pub fn fps(&self) -> &FpsSetting {
        &self.project.fps
    }

    pub fn max_frames(&self) -> usize {
        self.project.panes.max_frames()
    }

    pub fn status(&self, index: usize) -> Option<&PaneStatus> {
        self.statuses.get(index)
    }

    /// Owned copy of the panes for background rendering.
    pub fn snapshot(&self) -> Vec<PaneState> {
        self.project.panes.snapshot()
    }

    pub fn set_fps(&mut self, fps: FpsSetting) {
        self.project.fps = fps;
    }

    /// Point every pane at a new directory and re-resolve.
    pub fn set_base_directory(&mut self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        tracing::info!(dir = %dir.display(), "Base directory set");
        self.project.base_directory = Some(dir);
        self.refresh_all();
    }

    /// Replace the layout. Previous pane settings are discarded.
    pub fn set_layout(&mut self, layout: LayoutSpec) {
        self.project.panes.set_layout(layout);
        self.statuses = vec![PaneStatus::Unresolved; self.project.panes.len()];
        self.refresh_all();
    }

    pub fn set_pattern(&mut self, index: usize, pattern: impl Into<String>) {
        if self.project.panes.set_pattern(index, pattern) {
            self.refresh_pane(index);
        }
    }

    /// Disabling keeps the cached files; enabling re-resolves.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        if !self.project.panes.set_enabled(index, enabled) {
            return;
        }
        if enabled {
            self.refresh_pane(index);
        } else if let Some(status) = self.statuses.get_mut(index) {
            *status = PaneStatus::Disabled;
        }
    }

    /// Re-resolve one pane. Without a base directory an enabled pane is
    /// left empty and `Unresolved`.
    pub fn refresh_pane(&mut self, index: usize) {
        let Some(pane) = self.project.panes.get(index) else {
            return;
        };

        let (files, status) = match (&self.project.base_directory, pane.enabled) {
            (_, false) => (Vec::new(), PaneStatus::Disabled),
            (None, true) => (Vec::new(), PaneStatus::Unresolved),
            (Some(base), true) => match resolve(base, &pane.pattern) {
                Ok(files) => {
                    let count = files.len();
                    (files, PaneStatus::Matched(count))
                }
                Err(e) => {
                    tracing::warn!(pane = index + 1, error = %e, "Pattern rejected");
                    (Vec::new(), PaneStatus::Error(e.short_message()))
                }
            },
        };

        self.project.panes.set_files(index, files);
        if let Some(slot) = self.statuses.get_mut(index) {
            *slot = status;
        }
    }

    /// Re-resolve every pane.
    pub fn refresh_all(&mut self) {
        for index in 0..self.project.panes.len() {
            self.refresh_pane(index);
        }
        if self.project.base_directory.is_some() {
            tracing::info!(max_frames = self.max_frames(), "All patterns refreshed");
        }
    }

    /// Apply a project file and re-resolve. On error nothing changes.
    pub fn apply_project_file(&mut self, file: &ProjectFile) -> PaneviewResult<()> {
        file.apply(&mut self.project)?;
        self.statuses = vec![PaneStatus::Unresolved; self.project.panes.len()];
        self.refresh_all();
        Ok(())
    }

    /// Load a project file from disk and apply it.
    pub fn load_project_file(&mut self, path: &Path) -> PaneviewResult<()> {
        let file = ProjectFile::load(path)?;
        self.apply_project_file(&file)
    }

    /// Save the current settings as a project file.
    pub fn save_project_file(&self, path: &Path) -> PaneviewResult<()> {
        ProjectFile::capture(&self.project).save(path)?;
        Ok(())
    }
}
