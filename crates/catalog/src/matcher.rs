//! Glob resolution of pane patterns.

use std::path::{Path, PathBuf};

use glob::{glob_with, MatchOptions, Pattern};
use paneview_common::error::{PaneviewError, PaneviewResult};

use crate::order_key::sort_numeric;

/// Shell-style matching: case-sensitive, `*` and `?` stop at path
/// separators, and hidden entries need an explicit leading dot.
pub const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Check a pattern's syntax without touching the filesystem.
pub fn validate_pattern(pattern: &str) -> PaneviewResult<()> {
    Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| PaneviewError::pattern(pattern, e.to_string()))
}

/// Resolve `pattern` against `base_dir` into numerically ordered paths.
///
/// An empty (or all-whitespace) pattern resolves to nothing. Absolute
/// patterns ignore `base_dir`. Entries that cannot be read while walking
/// are skipped. Matches with equal numeric keys keep the enumeration order
/// of the glob walk, which is alphabetical per directory, so an unchanged
/// directory always resolves to the same sequence.
pub fn resolve(base_dir: &Path, pattern: &str) -> PaneviewResult<Vec<PathBuf>> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Ok(Vec::new());
    }
    validate_pattern(pattern)?;

    let full_pattern = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = Pattern::escape(&base_dir.to_string_lossy());
        if base.is_empty() {
            pattern.to_string()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), pattern)
        }
    };

    let entries = glob_with(&full_pattern, MATCH_OPTIONS)
        .map_err(|e| PaneviewError::pattern(pattern, e.to_string()))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unreadable glob entry");
            }
        }
    }

    sort_numeric(base_dir, &mut paths);
    tracing::debug!(pattern, matches = paths.len(), "Resolved pattern");
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_is_empty() {
        assert!(resolve(Path::new("/nonexistent"), "").unwrap().is_empty());
        assert!(resolve(Path::new("/nonexistent"), "   ").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_pattern_error() {
        let err = resolve(Path::new("/tmp"), "frames/[a-").unwrap_err();
        assert!(matches!(err, PaneviewError::Pattern { .. }));
        assert!(validate_pattern("***").is_err());
        assert!(validate_pattern("img_[0-9]?.png").is_ok());
    }

    #[test]
    fn test_missing_directory_matches_nothing() {
        let found = resolve(Path::new("/definitely/not/a/dir"), "*.png").unwrap();
        assert!(found.is_empty());
    }
}
