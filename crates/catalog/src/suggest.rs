//! Pattern suggestion from an example file.

use std::path::Path;

/// Turn one example file into a pattern matching its sequence.
///
/// The path is made relative to `base_dir` and the trailing digit run of
/// the file stem becomes `*`: `shots/frame_0012.png` gives
/// `shots/frame_*.png`. At least one leading stem character is kept, so
/// `12345.png` gives `1*.png`. A stem without a usable digit suffix gets
/// the wildcard appended instead: `notes.txt` gives `notes*.txt`.
pub fn suggest_pattern(base_dir: &Path, example: &Path) -> String {
    let relative = example.strip_prefix(base_dir).unwrap_or(example);
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = relative
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(i, _)| i);

    let file_pattern = match digits_start {
        Some(0) if stem.len() > 1 => format!("{}*{ext}", &stem[..1]),
        Some(start) if start > 0 => format!("{}*{ext}", &stem[..start]),
        _ => format!("{stem}*{ext}"),
    };

    let pattern = match relative.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file_pattern),
        _ => file_pattern.into(),
    };
    pattern.to_string_lossy().into_owned()
}
