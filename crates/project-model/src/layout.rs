//! Grid layout for the composite.
//!
//! A layout is written `RxC`: `R` rows by `C` columns. Panes are numbered
//! row-major, so cell `i` sits at row `i / cols`, column `i % cols`.

use std::fmt;
use std::str::FromStr;

use paneview_common::error::PaneviewError;
use serde::{Deserialize, Serialize};

/// Layouts offered by the viewer's layout picker.
pub const LAYOUT_PRESETS: [&str; 9] = [
    "1x1", "2x1", "1x2", "2x2", "3x2", "2x3", "3x3", "4x2", "2x4",
];

/// Largest accepted row or column count.
pub const MAX_DIMENSION: u32 = 16;

/// A rows x columns pane grid. Both dimensions are in `1..=MAX_DIMENSION`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LayoutSpec {
    rows: u32,
    cols: u32,
}

impl LayoutSpec {
    /// Single-pane layout.
    pub const SINGLE: LayoutSpec = LayoutSpec { rows: 1, cols: 1 };

    /// Create a layout, rejecting empty and oversized grids.
    pub fn new(rows: u32, cols: u32) -> Result<Self, PaneviewError> {
        if rows == 0 || cols == 0 {
            return Err(PaneviewError::config(format!(
                "layout must have at least one row and column, got {rows}x{cols}"
            )));
        }
        if rows > MAX_DIMENSION || cols > MAX_DIMENSION {
            return Err(PaneviewError::config(format!(
                "layout {rows}x{cols} exceeds the {MAX_DIMENSION}x{MAX_DIMENSION} maximum"
            )));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Number of pane slots in the grid.
    pub fn total_panes(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    /// Size of one cell on a canvas of the given size.
    ///
    /// Integer division: the `canvas % cols` rightmost columns and
    /// `canvas % rows` bottom rows of pixels belong to no cell.
    pub fn cell_size(&self, canvas_width: u32, canvas_height: u32) -> (u32, u32) {
        (canvas_width / self.cols, canvas_height / self.rows)
    }

    /// Top-left corner of cell `index` for cells of the given size.
    pub fn cell_origin(&self, index: usize, cell_width: u32, cell_height: u32) -> (u32, u32) {
        let row = (index / self.cols as usize) as u32;
        let col = (index % self.cols as usize) as u32;
        (col * cell_width, row * cell_height)
    }
}

impl Default for LayoutSpec {
    fn default() -> Self {
        Self::SINGLE
    }
}

impl FromStr for LayoutSpec {
    type Err = PaneviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rows, cols) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| PaneviewError::config(format!("layout '{s}' is not of the form RxC")))?;
        let parse = |part: &str| {
            part.trim().parse::<u32>().map_err(|e| {
                PaneviewError::config(format!("layout '{s}' has a bad dimension '{part}': {e}"))
            })
        };
        Self::new(parse(rows)?, parse(cols)?)
    }
}

impl TryFrom<String> for LayoutSpec {
    type Error = PaneviewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayoutSpec> for String {
    fn from(layout: LayoutSpec) -> Self {
        layout.to_string()
    }
}

impl fmt::Display for LayoutSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
