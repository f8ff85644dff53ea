//! Numeric ordering of matched files.
//!
//! The key of a name is the sequence of its maximal ASCII digit runs, read
//! left to right as decimal values: `run3/img_0010.png` keys as `(3, 10)`.
//! Keys compare lexicographically, and a key that is a proper prefix of
//! another sorts first, so `a1.png` < `a1_2.png` < `a2.png`.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// One digit run, stored without leading zeros so values of any length
/// compare without overflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericToken(String);

impl NumericToken {
    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0".to_string())
        } else {
            Self(trimmed.to_string())
        }
    }
}

impl Ord for NumericToken {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NumericToken {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort key built from the digit runs of a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NumericOrderKey(Vec<NumericToken>);

impl NumericOrderKey {
    /// Build the key for a file name or relative path.
    pub fn of(name: &str) -> Self {
        let mut tokens = Vec::new();
        let mut run_start: Option<usize> = None;

        for (i, c) in name.char_indices() {
            match (c.is_ascii_digit(), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    tokens.push(NumericToken::from_digits(&name[start..i]));
                    run_start = None;
                }
                _ => {}
            }
        }
        if let Some(start) = run_start {
            tokens.push(NumericToken::from_digits(&name[start..]));
        }

        Self(tokens)
    }
}

/// Key for a matched path, taken relative to `base_dir` when possible.
pub fn path_key(base_dir: &Path, path: &Path) -> NumericOrderKey {
    let relative = path.strip_prefix(base_dir).unwrap_or(path);
    NumericOrderKey::of(&relative.to_string_lossy())
}

/// Stable sort by numeric key: equal keys keep their incoming order.
pub fn sort_numeric(base_dir: &Path, paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|path| path_key(base_dir, path));
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Token values as integers; `None` for runs wider than `u64`.
    fn values(key: &NumericOrderKey) -> Vec<Option<u64>> {
        key.0.iter().map(|token| token.0.parse().ok()).collect()
    }

    #[test]
    fn test_extracts_all_runs() {
        let key = NumericOrderKey::of("run3/img_0010_v2.png");
        assert_eq!(values(&key), vec![Some(3), Some(10), Some(2)]);
    }

    #[test]
    fn test_no_digits_is_empty_key() {
        assert!(NumericOrderKey::of("readme.txt").0.is_empty());
    }

    #[test]
    fn test_numeric_not_lexicographic() {
        let mut paths: Vec<PathBuf> = ["img2.png", "img10.png", "img1.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_numeric(Path::new(""), &mut paths);
        let names: Vec<_> = paths.iter().map(|p| p.to_string_lossy()).collect();
        assert_eq!(names, vec!["img1.png", "img2.png", "img10.png"]);
    }

    #[test]
    fn test_prefix_key_sorts_first() {
        assert!(NumericOrderKey::of("a1.png") < NumericOrderKey::of("a1_2.png"));
        assert!(NumericOrderKey::of("a1_2.png") < NumericOrderKey::of("a2.png"));
        assert!(NumericOrderKey::of("plain.png") < NumericOrderKey::of("a0.png"));
    }

    #[test]
    fn test_leading_zeros_are_numeric() {
        assert_eq!(
            NumericOrderKey::of("f007.png"),
            NumericOrderKey::of("f7.png")
        );
        assert_eq!(values(&NumericOrderKey::of("f000")), vec![Some(0)]);
    }

    #[test]
    fn test_huge_runs_do_not_overflow() {
        let small = NumericOrderKey::of("x99999999999999999999.png");
        let large = NumericOrderKey::of("x100000000000000000000.png");
        assert!(small < large);
        assert_eq!(values(&large), vec![None]);
    }

    #[test]
    fn test_ties_keep_incoming_order() {
        let mut paths: Vec<PathBuf> = ["b_1.png", "a_1.png", "c_0.png", "a-1.png"]
            .iter()
            .map(PathBuf::from)
            .collect();
        sort_numeric(Path::new(""), &mut paths);
        let names: Vec<_> = paths.iter().map(|p| p.to_string_lossy()).collect();
        assert_eq!(names, vec!["c_0.png", "b_1.png", "a_1.png", "a-1.png"]);
    }

    #[test]
    fn test_base_directory_digits_are_ignored() {
        let base = Path::new("/data/2024");
        let key = path_key(base, Path::new("/data/2024/frame_5.png"));
        assert_eq!(values(&key), vec![Some(5)]);
    }

    proptest! {
        #[test]
        fn prop_key_matches_u64_order(a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let ka = NumericOrderKey::of(&format!("frame_{a:04}.png"));
            let kb = NumericOrderKey::of(&format!("frame_{b}.png"));
            prop_assert_eq!(ka.cmp(&kb), a.cmp(&b));
        }

        #[test]
        fn prop_sort_is_idempotent(names in proptest::collection::vec("[a-c0-9_]{1,8}", 0..20)) {
            let mut once: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
            sort_numeric(Path::new(""), &mut once);
            let mut twice = once.clone();
            sort_numeric(Path::new(""), &mut twice);
            prop_assert_eq!(once, twice);
        }
    }
}
