use std::path::{Path, PathBuf};

use paneview_catalog::{resolve, PaneStatus, Workspace};
use paneview_common::logging::init_default_logging;
use paneview_project_model::{LayoutSpec, ProjectFile};

fn fixture_dir(name: &str, files: &[&str]) -> PathBuf {
    init_default_logging();
    let dir = std::env::temp_dir().join(format!("paneview_catalog_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    for file in files {
        let path = dir.join(file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, file.as_bytes()).unwrap();
    }
    dir
}

fn names(base: &Path, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.strip_prefix(base).unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn resolve_orders_numerically_and_is_repeatable() {
    let dir = fixture_dir(
        "ordering",
        &["img10.png", "img2.png", "img1.png", "img1.jpg", "notes.txt"],
    );

    let first = resolve(&dir, "img*.png").unwrap();
    assert_eq!(names(&dir, &first), vec!["img1.png", "img2.png", "img10.png"]);

    let again = resolve(&dir, "img*.png").unwrap();
    assert_eq!(first, again);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resolve_is_case_sensitive_and_skips_hidden() {
    let dir = fixture_dir("case", &["a1.PNG", "a2.png", ".a3.png"]);

    let found = resolve(&dir, "*.png").unwrap();
    assert_eq!(names(&dir, &found), vec!["a2.png"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resolve_walks_subdirectories_in_pattern() {
    let dir = fixture_dir(
        "subdirs",
        &["run2/out_1.txt", "run10/out_1.txt", "run1/out_3.txt", "run1/out_1.txt"],
    );

    let found = resolve(&dir, "run*/out_?.txt").unwrap();
    assert_eq!(
        names(&dir, &found),
        vec!["run1/out_1.txt", "run1/out_3.txt", "run2/out_1.txt", "run10/out_1.txt"]
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn resolve_supports_character_classes() {
    let dir = fixture_dir("classes", &["f1.csv", "f2.csv", "f3.csv", "g1.csv"]);

    let found = resolve(&dir, "f[12].csv").unwrap();
    assert_eq!(names(&dir, &found), vec!["f1.csv", "f2.csv"]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn workspace_tracks_frames_across_panes() {
    let dir = fixture_dir(
        "workspace",
        &["a/1.png", "a/2.png", "a/3.png", "a/4.png", "a/5.png", "b/1.txt", "b/2.txt", "b/3.txt"],
    );

    let mut ws = Workspace::new(LayoutSpec::new(1, 3).unwrap());
    ws.set_base_directory(&dir);
    ws.set_pattern(0, "a/*.png");
    ws.set_pattern(1, "b/*.txt");
    ws.set_pattern(2, "c/*.bin");

    assert_eq!(ws.max_frames(), 5);
    assert_eq!(ws.status(0), Some(&PaneStatus::Matched(5)));
    assert_eq!(ws.status(2), Some(&PaneStatus::Matched(0)));

    ws.set_enabled(0, false);
    assert_eq!(ws.max_frames(), 3);
    assert_eq!(ws.panes().get(0).unwrap().files.len(), 5);
    assert_eq!(ws.status(0), Some(&PaneStatus::Disabled));

    ws.set_enabled(0, true);
    assert_eq!(ws.max_frames(), 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn project_file_roundtrip_through_workspace() {
    let dir = fixture_dir("project_file", &["x/1.png", "x/2.png", "y/1.log"]);
    let config_path = dir.join("session.json");

    let mut ws = Workspace::new(LayoutSpec::new(2, 1).unwrap());
    ws.set_base_directory(&dir);
    ws.set_pattern(0, "x/*.png");
    ws.set_pattern(1, "y/*.log");
    ws.set_enabled(1, false);
    ws.save_project_file(&config_path).unwrap();

    let mut restored = Workspace::default();
    restored.load_project_file(&config_path).unwrap();

    assert_eq!(restored.layout(), LayoutSpec::new(2, 1).unwrap());
    assert_eq!(restored.base_directory(), Some(dir.as_path()));
    assert_eq!(restored.max_frames(), 2);
    assert_eq!(restored.status(1), Some(&PaneStatus::Disabled));
    assert_eq!(
        ProjectFile::capture(restored.project()),
        ProjectFile::capture(ws.project())
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn clearing_base_directory_drops_resolved_files() {
    let dir = fixture_dir("cleared_base", &["a/1.png", "a/2.png"]);

    let mut ws = Workspace::new(LayoutSpec::SINGLE);
    ws.set_base_directory(&dir);
    ws.set_pattern(0, "a/*.png");
    assert_eq!(ws.max_frames(), 2);

    let cleared = ProjectFile::from_json(r#"{"base_directory": ""}"#).unwrap();
    ws.apply_project_file(&cleared).unwrap();

    assert_eq!(ws.base_directory(), None);
    assert_eq!(ws.status(0), Some(&PaneStatus::Unresolved));
    assert!(ws.panes().get(0).unwrap().files.is_empty());
    assert_eq!(ws.max_frames(), 0);

    std::fs::remove_dir_all(&dir).ok();
}
