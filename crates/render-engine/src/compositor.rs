//! Grid compositor: assembles one frame from every pane's tile.
//!
//! Output depends only on the frame index, the panes' file lists, the
//! layout, and the canvas size, so two renders of the same inputs are
//! pixel-identical.

use image::imageops;
use image::{Rgb, RgbImage};
use paneview_project_model::{LayoutSpec, PaneState};
use serde::{Deserialize, Serialize};

use crate::tile::{palette, PaneContentRenderer};

/// Output canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(1000, 700)
    }
}

/// What a grid cell shows at a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellContent<'a> {
    /// No pane configured, or the pane is disabled: background only.
    Skipped,
    /// Pane has no file at this frame.
    Empty,
    File(&'a std::path::Path),
}

/// Decide what cell `index` shows at `frame_index`.
pub fn cell_content(panes: &[PaneState], index: usize, frame_index: usize) -> CellContent<'_> {
    match panes.get(index) {
        Some(pane) if pane.enabled => match pane.file_at(frame_index) {
            Some(path) => CellContent::File(path),
            None => CellContent::Empty,
        },
        _ => CellContent::Skipped,
    }
}

/// Renders full composite frames.
#[derive(Debug, Clone)]
pub struct CompositeFrameRenderer {
    tiles: PaneContentRenderer,
    background: Rgb<u8>,
}

impl Default for CompositeFrameRenderer {
    fn default() -> Self {
        Self {
            tiles: PaneContentRenderer::new(),
            background: palette::BLACK,
        }
    }
}

impl CompositeFrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render frame `frame_index` of `panes` arranged in `layout`.
    ///
    /// Cells are `canvas / grid` pixels (integer division); leftover pixels
    /// on the right and bottom stay background.
    pub fn render(
        &self,
        frame_index: usize,
        panes: &[PaneState],
        layout: LayoutSpec,
        canvas: CanvasSize,
    ) -> RgbImage {
        let mut frame = RgbImage::from_pixel(canvas.width, canvas.height, self.background);
        let (cell_w, cell_h) = layout.cell_size(canvas.width, canvas.height);
        if cell_w == 0 || cell_h == 0 {
            tracing::debug!(
                width = canvas.width,
                height = canvas.height,
                layout = %layout,
                "Canvas too small for layout"
            );
            return frame;
        }

        for index in 0..layout.total_panes() {
            let pane_number = index + 1;
            let tile = match cell_content(panes, index, frame_index) {
                CellContent::Skipped => continue,
                CellContent::Empty => self.tiles.render_empty(cell_w, cell_h, pane_number),
                CellContent::File(path) => self.tiles.render(path, cell_w, cell_h, pane_number),
            };
            let (x, y) = layout.cell_origin(index, cell_w, cell_h);
            imageops::replace(&mut frame, &tile, x as i64, y as i64);
        }

        frame
    }
}

/// Convenience wrapper around [`CompositeFrameRenderer::render`].
pub fn render_composite(
    frame_index: usize,
    panes: &[PaneState],
    layout: LayoutSpec,
    canvas: CanvasSize,
) -> RgbImage {
    CompositeFrameRenderer::default().render(frame_index, panes, layout, canvas)
}
