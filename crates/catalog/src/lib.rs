//! Paneview Catalog
//!
//! Turns per-pane glob patterns into ordered file sequences:
//! - **Matcher:** shell-glob resolution relative to a base directory
//! - **Ordering:** numeric sort keys built from digit runs in file names
//! - **Suggestion:** a pattern derived from one example file
//! - **Workspace:** the pane-management layer that keeps resolved files,
//!   statuses, and `max_frames` current

pub mod matcher;
pub mod order_key;
pub mod suggest;
pub mod workspace;

pub use matcher::{resolve, validate_pattern};
pub use order_key::{path_key, sort_numeric, NumericOrderKey};
pub use suggest::suggest_pattern;
pub use workspace::{PaneStatus, Workspace};
