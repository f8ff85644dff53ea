//! Image decoding for image tiles.

use std::path::Path;

use image::RgbImage;
use paneview_common::error::{PaneviewError, PaneviewResult};

/// Extensions rendered as images.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Extensions rendered as text.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "py", "js", "html", "css", "json", "xml", "log", "csv",
];

/// Decode any supported image file into 8-bit RGB.
pub fn decode_rgb(path: &Path) -> PaneviewResult<RgbImage> {
    let decoded = image::open(path).map_err(|e| PaneviewError::decode(path, e.to_string()))?;
    let rgb = decoded.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(PaneviewError::decode(path, "image has no pixels"));
    }
    Ok(rgb)
}

/// How a file is drawn inside a tile, chosen by lowercase extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Image,
    Text,
    Other,
}

impl FileCategory {
    pub fn of(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if TEXT_EXTENSIONS.contains(&ext.as_str()) {
            Self::Text
        } else {
            Self::Other
        }
    }
}
