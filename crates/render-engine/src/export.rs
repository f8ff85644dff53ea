//! Export configuration and job management.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::ImageFormat;
use paneview_common::error::{PaneviewError, PaneviewResult};
use paneview_project_model::{max_frames, LayoutSpec, PaneState};

use crate::compositor::{CanvasSize, CompositeFrameRenderer};
use crate::encoder::{FfmpegBackend, VideoBackend, VideoSpec};

/// Still formats accepted by [`ExportEngine::export_frame`], by extension.
pub const STILL_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// A video export ready to be rendered.
///
/// The job owns its own copy of the panes, so re-resolving patterns while
/// an export runs cannot change what gets written.
#[derive(Debug, Clone)]
pub struct VideoExportJob {
    /// Output file path; the extension picks the container.
    pub output_path: PathBuf,

    /// Frames per second of the output stream.
    pub fps: f64,

    /// Four-character codec tag.
    pub fourcc: String,

    pub canvas: CanvasSize,

    pub layout: LayoutSpec,

    /// Pane snapshot taken when the job was created.
    pub panes: Vec<PaneState>,
}

impl VideoExportJob {
    pub fn total_frames(&self) -> usize {
        max_frames(&self.panes)
    }

    fn video_spec(&self) -> VideoSpec {
        VideoSpec {
            output_path: self.output_path.clone(),
            fourcc: self.fourcc.clone(),
            fps: self.fps,
            width: self.canvas.width,
            height: self.canvas.height,
        }
    }
}

/// Progress callback for export rendering.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Export progress report.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    /// Current progress [0.0, 1.0].
    pub progress: f64,

    /// Frames written so far.
    pub frames_rendered: u64,

    /// Total frames to write.
    pub total_frames: u64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    /// Current stage.
    pub stage: ExportStage,
}

impl ExportProgress {
    fn at(stage: ExportStage, frames_rendered: u64, total_frames: u64, elapsed_secs: f64) -> Self {
        let progress = if total_frames == 0 {
            0.0
        } else {
            frames_rendered as f64 / total_frames as f64
        };
        let eta_secs = if frames_rendered == 0 {
            0.0
        } else {
            let per_frame = elapsed_secs / frames_rendered as f64;
            per_frame * total_frames.saturating_sub(frames_rendered) as f64
        };
        Self {
            progress,
            frames_rendered,
            total_frames,
            eta_secs,
            stage,
        }
    }
}

/// Stages of the export process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Preparing,
    Rendering,
    Finalizing,
    Complete,
    Failed,
}

/// Renders composite frames and writes them out as video or stills.
pub struct ExportEngine {
    renderer: CompositeFrameRenderer,
    backend: Box<dyn VideoBackend>,
}

impl Default for ExportEngine {
    fn default() -> Self {
        Self::new(Box::new(FfmpegBackend::new()))
    }
}

impl ExportEngine {
    pub fn new(backend: Box<dyn VideoBackend>) -> Self {
        Self {
            renderer: CompositeFrameRenderer::new(),
            backend,
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Render every frame of `job` in order and encode them.
    ///
    /// A file that fails to decode only degrades its own tile. The first
    /// failure to open or write the stream aborts the export.
    pub fn export_video(
        &self,
        job: &VideoExportJob,
        progress: Option<ProgressCallback>,
    ) -> PaneviewResult<PathBuf> {
        let report = |p: ExportProgress| {
            if let Some(cb) = &progress {
                cb(p);
            }
        };
        let total = job.total_frames() as u64;

        tracing::info!(
            output = %job.output_path.display(),
            frames = total,
            fps = job.fps,
            layout = %job.layout,
            backend = self.backend.name(),
            "Starting video export"
        );
        report(ExportProgress::at(ExportStage::Preparing, 0, total, 0.0));

        let result = self.write_video(job, total, &report);
        match &result {
            Ok(()) => {
                report(ExportProgress::at(ExportStage::Complete, total, total, 0.0));
                tracing::info!(output = %job.output_path.display(), "Video export complete");
            }
            Err(e) => {
                report(ExportProgress::at(ExportStage::Failed, 0, total, 0.0));
                tracing::error!(error = %e, "Video export failed");
            }
        }
        result.map(|()| job.output_path.clone())
    }

    fn write_video(
        &self,
        job: &VideoExportJob,
        total: u64,
        report: &dyn Fn(ExportProgress),
    ) -> PaneviewResult<()> {
        if total == 0 {
            return Err(PaneviewError::export("no frames to export"));
        }

        let mut encoder = self.backend.open(&job.video_spec())?;
        let start = Instant::now();

        for frame_index in 0..job.total_frames() {
            let frame = self
                .renderer
                .render(frame_index, &job.panes, job.layout, job.canvas);
            encoder.write_frame(&frame)?;

            let written = frame_index as u64 + 1;
            tracing::debug!(frame = frame_index, "Frame written");
            report(ExportProgress::at(
                ExportStage::Rendering,
                written,
                total,
                start.elapsed().as_secs_f64(),
            ));
        }

        report(ExportProgress::at(
            ExportStage::Finalizing,
            total,
            total,
            start.elapsed().as_secs_f64(),
        ));
        encoder.finish()
    }

    /// Render one composite frame and save it as a still image.
    ///
    /// The extension of `path` picks the format. Parent directories are
    /// not created.
    pub fn export_frame(
        &self,
        path: &Path,
        frame_index: usize,
        canvas: CanvasSize,
        panes: &[PaneState],
        layout: LayoutSpec,
    ) -> PaneviewResult<PathBuf> {
        let format = still_format(path)?;
        if max_frames(panes) == 0 {
            return Err(PaneviewError::export("no frames to export"));
        }

        let frame = self.renderer.render(frame_index, panes, layout, canvas);
        frame
            .save_with_format(path, format)
            .map_err(|e| PaneviewError::export(format!("failed to write {}: {e}", path.display())))?;

        tracing::info!(
            output = %path.display(),
            frame = frame_index,
            "Frame exported"
        );
        Ok(path.to_path_buf())
    }
}

/// Image format for a still output path.
pub fn still_format(path: &Path) -> PaneviewResult<ImageFormat> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => Ok(ImageFormat::Png),
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "bmp" => Ok(ImageFormat::Bmp),
        "gif" => Ok(ImageFormat::Gif),
        _ => Err(PaneviewError::export(format!(
            "unsupported image format '{}' (expected one of: {})",
            ext,
            STILL_FORMATS.join(", ")
        ))),
    }
}
