//! Pane state and frame indexing.
//!
//! Panes live in a plain indexed arena ([`PaneSet`]) sized by the layout.
//! The UI reads and writes through pane indices; it never owns the state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::LayoutSpec;

/// One pane's pattern, enabled flag, and resolved files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneState {
    /// Glob pattern relative to the base directory.
    pub pattern: String,

    /// Disabled panes draw nothing and do not count toward `max_frames`.
    pub enabled: bool,

    /// Resolved files in frame order. Replaced wholesale on re-resolution.
    #[serde(skip)]
    pub files: Vec<PathBuf>,
}

impl Default for PaneState {
    fn default() -> Self {
        Self {
            pattern: String::new(),
            enabled: true,
            files: Vec::new(),
        }
    }
}

impl PaneState {
    pub fn new(pattern: impl Into<String>, enabled: bool) -> Self {
        Self {
            pattern: pattern.into(),
            enabled,
            files: Vec::new(),
        }
    }

    /// Builder-style helper used mostly by tests and fixtures.
    pub fn with_files(mut self, files: Vec<PathBuf>) -> Self {
        self.files = files;
        self
    }

    /// Number of frames this pane contributes: zero when disabled.
    pub fn frame_count(&self) -> usize {
        if self.enabled {
            self.files.len()
        } else {
            0
        }
    }

    /// File shown at `frame_index`, or `None` for an empty tile.
    pub fn file_at(&self, frame_index: usize) -> Option<&PathBuf> {
        self.files.get(frame_index)
    }
}

/// Total playable frames: the longest enabled pane, or 0.
pub fn max_frames(panes: &[PaneState]) -> usize {
    panes.iter().map(PaneState::frame_count).max().unwrap_or(0)
}

/// Clamp a requested frame position into `[0, max_frames - 1]` (0 when empty).
pub fn clamp_frame(frame_index: usize, max_frames: usize) -> usize {
    frame_index.min(max_frames.saturating_sub(1))
}

/// Human-readable frame position, 1-based.
pub fn frame_label(frame_index: usize, max_frames: usize) -> String {
    format!("Frame: {}/{}", frame_index + 1, max_frames.max(1))
}

/// The pane arena for one layout.
///
/// Changing the layout discards every pane and recreates default slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneSet {
    layout: LayoutSpec,
    panes: Vec<PaneState>,
    max_frames: usize,
}

impl PaneSet {
    pub fn new(layout: LayoutSpec) -> Self {
        Self {
            layout,
            panes: vec![PaneState::default(); layout.total_panes()],
            max_frames: 0,
        }
    }

    pub fn layout(&self) -> LayoutSpec {
        self.layout
    }

    /// Replace the layout, recreating empty pane slots.
    pub fn set_layout(&mut self, layout: LayoutSpec) {
        tracing::debug!(%layout, "Recreating pane slots");
        *self = Self::new(layout);
    }

    pub fn panes(&self) -> &[PaneState] {
        &self.panes
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PaneState> {
        self.panes.get(index)
    }

    /// Set a pane's pattern. Returns `false` when the index is out of range.
    /// The caller is responsible for re-resolving the pane afterwards.
    pub fn set_pattern(&mut self, index: usize, pattern: impl Into<String>) -> bool {
        match self.panes.get_mut(index) {
            Some(pane) => {
                pane.pattern = pattern.into();
                true
            }
            None => false,
        }
    }

    /// Enable or disable a pane. Cached files are kept either way.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        match self.panes.get_mut(index) {
            Some(pane) => {
                pane.enabled = enabled;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Replace a pane's resolved file list.
    pub fn set_files(&mut self, index: usize, files: Vec<PathBuf>) -> bool {
        match self.panes.get_mut(index) {
            Some(pane) => {
                pane.files = files;
                self.recompute();
                true
            }
            None => false,
        }
    }

    /// Cached `max_frames`, kept current after every mutation.
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Owned copy of the pane list for background work.
    pub fn snapshot(&self) -> Vec<PaneState> {
        self.panes.clone()
    }

    fn recompute(&mut self) {
        self.max_frames = max_frames(&self.panes);
    }
}

impl Default for PaneSet {
    fn default() -> Self {
        Self::new(LayoutSpec::SINGLE)
    }
}
