//! Paneview Render Engine
//!
//! Turns pane file lists into pixels and pixels into files.
//!
//! # Pipeline
//!
//! ```text
//! pane files ──> PaneContentRenderer (one tile per pane)
//!                      │
//!                      ▼
//!              CompositeFrameRenderer (RxC grid, opaque paste)
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//!    export_frame             export_video
//!   (png/jpg/bmp/gif)     (VideoBackend, ffmpeg)
//! ```

pub mod compositor;
pub mod decode;
pub mod encoder;
pub mod export;
pub mod font;
pub mod tile;

pub use compositor::*;
pub use encoder::*;
pub use export::*;
pub use tile::PaneContentRenderer;
