use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use paneview_common::error::{PaneviewError, PaneviewResult};
use paneview_common::logging::init_default_logging;
use paneview_project_model::{LayoutSpec, PaneState};
use paneview_render_engine::tile::palette;
use paneview_render_engine::{
    render_composite, CanvasSize, ExportEngine, ExportProgress, ExportStage, FfmpegBackend,
    ProgressCallback, VideoBackend, VideoEncoder, VideoExportJob, VideoSpec,
};

fn fixture_dir(name: &str) -> PathBuf {
    init_default_logging();
    let dir = std::env::temp_dir().join(format!("paneview_render_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn text_files(dir: &PathBuf, prefix: &str, count: usize) -> Vec<PathBuf> {
    (1..=count)
        .map(|i| {
            let path = dir.join(format!("{prefix}{i}.txt"));
            std::fs::write(&path, format!("{prefix} line {i}\n")).unwrap();
            path
        })
        .collect()
}

#[derive(Default)]
struct Recorded {
    frames: Vec<RgbImage>,
    finished: bool,
}

/// Keeps frames in memory; optionally fails on one frame.
#[derive(Clone, Default)]
struct MemoryBackend {
    recorded: Arc<Mutex<Recorded>>,
    fail_at: Option<usize>,
}

struct MemoryEncoder {
    recorded: Arc<Mutex<Recorded>>,
    fail_at: Option<usize>,
    written: usize,
}

impl VideoBackend for MemoryBackend {
    fn open(&self, spec: &VideoSpec) -> PaneviewResult<Box<dyn VideoEncoder>> {
        spec.validate()?;
        Ok(Box::new(MemoryEncoder {
            recorded: Arc::clone(&self.recorded),
            fail_at: self.fail_at,
            written: 0,
        }))
    }

    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl VideoEncoder for MemoryEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> PaneviewResult<()> {
        if self.fail_at == Some(self.written) {
            return Err(PaneviewError::export("stream closed"));
        }
        self.recorded.lock().unwrap().frames.push(frame.clone());
        self.written += 1;
        Ok(())
    }

    fn finish(self: Box<Self>) -> PaneviewResult<()> {
        self.recorded.lock().unwrap().finished = true;
        Ok(())
    }
}

fn job(dir: &PathBuf, panes: Vec<PaneState>, layout: LayoutSpec) -> VideoExportJob {
    VideoExportJob {
        output_path: dir.join("out.mp4"),
        fps: 5.0,
        fourcc: "mp4v".into(),
        canvas: CanvasSize::new(240, 160),
        layout,
        panes,
    }
}

#[test]
fn composite_is_deterministic() {
    let dir = fixture_dir("determinism");
    let panes = vec![
        PaneState::new("a*.txt", true).with_files(text_files(&dir, "a", 2)),
        PaneState::new("b*.txt", true).with_files(text_files(&dir, "b", 1)),
    ];
    let layout = LayoutSpec::new(1, 2).unwrap();
    let canvas = CanvasSize::new(300, 120);

    for frame in 0..3 {
        let first = render_composite(frame, &panes, layout, canvas);
        let second = render_composite(frame, &panes, layout, canvas);
        assert_eq!(first.as_raw(), second.as_raw());
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn export_frame_grid_with_empty_pane() {
    let dir = fixture_dir("grid_still");
    let panes = vec![
        PaneState::new("a", true).with_files(text_files(&dir, "a", 3)),
        PaneState::new("b", true).with_files(text_files(&dir, "b", 3)),
        PaneState::new("c", true),
        PaneState::new("d", true).with_files(text_files(&dir, "d", 1)),
    ];
    let layout = LayoutSpec::new(2, 2).unwrap();
    let canvas = CanvasSize::new(400, 300);
    let engine = ExportEngine::new(Box::new(MemoryBackend::default()));
    let out = dir.join("out.png");

    engine.export_frame(&out, 0, canvas, &panes, layout).unwrap();
    let first_bytes = std::fs::read(&out).unwrap();
    engine.export_frame(&out, 0, canvas, &panes, layout).unwrap();
    assert_eq!(first_bytes, std::fs::read(&out).unwrap());

    let frame = image::open(&out).unwrap().to_rgb8();
    let corners = [(0, 0), (200, 0), (0, 150), (200, 150)];
    let borders: Vec<Rgb<u8>> = corners
        .iter()
        .map(|&(x, y)| *frame.get_pixel(x, y))
        .collect();
    assert_eq!(
        borders,
        vec![palette::WHITE, palette::WHITE, palette::GRAY, palette::WHITE]
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn corrupt_file_does_not_abort_video_export() {
    let dir = fixture_dir("corrupt");
    let good = dir.join("img1.png");
    RgbImage::from_pixel(16, 16, Rgb([0, 0, 255])).save(&good).unwrap();
    let corrupt = dir.join("img2.png");
    std::fs::write(&corrupt, b"\x89PNG truncated").unwrap();
    let missing = dir.join("img3.png");

    let panes = vec![PaneState::new("img*.png", true).with_files(vec![good, corrupt, missing])];
    let backend = MemoryBackend::default();
    let engine = ExportEngine::new(Box::new(backend.clone()));

    let stages = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&stages);
    let progress: ProgressCallback =
        Box::new(move |p: ExportProgress| sink.lock().unwrap().push(p.stage));

    engine
        .export_video(&job(&dir, panes, LayoutSpec::SINGLE), Some(progress))
        .unwrap();

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 3);
    assert!(recorded.finished);
    assert!(recorded.frames.iter().all(|f| f.dimensions() == (240, 160)));
    let annotated: Vec<bool> = recorded
        .frames
        .iter()
        .map(|f| f.pixels().any(|p| *p == palette::RED))
        .collect();
    assert_eq!(annotated, vec![false, true, true]);

    let stages = stages.lock().unwrap();
    assert_eq!(stages.first(), Some(&ExportStage::Preparing));
    assert_eq!(stages.last(), Some(&ExportStage::Complete));
    assert!(stages.contains(&ExportStage::Finalizing));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn write_failure_stops_export() {
    let dir = fixture_dir("write_failure");
    let panes = vec![PaneState::new("a", true).with_files(text_files(&dir, "a", 5))];
    let backend = MemoryBackend {
        fail_at: Some(2),
        ..Default::default()
    };
    let engine = ExportEngine::new(Box::new(backend.clone()));

    let last = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&last);
    let progress: ProgressCallback =
        Box::new(move |p: ExportProgress| *sink.lock().unwrap() = Some(p.stage));

    let err = engine
        .export_video(&job(&dir, panes, LayoutSpec::SINGLE), Some(progress))
        .unwrap_err();
    assert!(matches!(err, PaneviewError::Export { .. }));

    let recorded = backend.recorded.lock().unwrap();
    assert_eq!(recorded.frames.len(), 2);
    assert!(!recorded.finished);
    assert_eq!(*last.lock().unwrap(), Some(ExportStage::Failed));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn unsupported_outputs_fail_before_rendering() {
    let dir = fixture_dir("unsupported");
    let panes = vec![PaneState::new("a", true).with_files(text_files(&dir, "a", 2))];

    let engine = ExportEngine::new(Box::new(FfmpegBackend::new()));
    let mut bad_video = job(&dir, panes.clone(), LayoutSpec::SINGLE);
    bad_video.output_path = dir.join("out.webm");
    assert!(matches!(
        engine.export_video(&bad_video, None),
        Err(PaneviewError::Export { .. })
    ));

    let err = engine
        .export_frame(
            &dir.join("out.tga"),
            0,
            CanvasSize::default(),
            &panes,
            LayoutSpec::SINGLE,
        )
        .unwrap_err();
    assert!(matches!(err, PaneviewError::Export { .. }));

    let unwritable = dir.join("missing_subdir").join("out.png");
    assert!(engine
        .export_frame(&unwritable, 0, CanvasSize::default(), &panes, LayoutSpec::SINGLE)
        .is_err());
    assert!(!unwritable.exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn nothing_to_export_is_an_error() {
    let dir = fixture_dir("no_frames");
    let engine = ExportEngine::new(Box::new(MemoryBackend::default()));
    let panes = vec![PaneState::new("", true)];
    assert!(engine
        .export_video(&job(&dir, panes, LayoutSpec::SINGLE), None)
        .is_err());
    std::fs::remove_dir_all(&dir).ok();
}
