//! Paneview Project Model
//!
//! Defines the core data contracts for Paneview sessions:
//! - **Layout:** the `RxC` pane grid and its cell geometry
//! - **Panes:** per-pane pattern, enabled flag, and resolved files
//! - **Frames:** the shared frame index space across panes
//! - **Project:** base directory, fps, and the saved project file
//!
//! Panes are aligned by index position only: frame `i` shows the `i`-th
//! file of every enabled pane, and shorter panes show an empty tile.

pub mod fps;
pub mod layout;
pub mod pane;
pub mod project;

pub use fps::*;
pub use layout::*;
pub use pane::*;
pub use project::*;
