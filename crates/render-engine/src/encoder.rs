//! Video-encode capability.
//!
//! [`VideoBackend`] opens an encoder for one output file; the returned
//! [`VideoEncoder`] takes frames in order and is finalized once. The
//! production backend pipes raw RGB frames into the system `ffmpeg`
//! binary.

use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use image::RgbImage;
use paneview_common::error::{PaneviewError, PaneviewResult};

/// Containers accepted for video output, by file extension.
pub const VIDEO_CONTAINERS: &[&str] = &["mp4", "avi", "mov", "mkv"];

/// Default codec tag.
pub const DEFAULT_FOURCC: &str = "mp4v";

/// Everything needed to open one output stream.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoSpec {
    pub output_path: PathBuf,
    pub fourcc: String,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
}

impl VideoSpec {
    /// Reject settings no backend can honor, before anything is spawned.
    pub fn validate(&self) -> PaneviewResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PaneviewError::export("frame width/height must be non-zero"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(PaneviewError::export(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        container_of(&self.output_path)?;
        Codec::from_fourcc(&self.fourcc)?;

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                return Err(PaneviewError::export(format!(
                    "output directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        Ok(())
    }
}

/// Lowercase container extension of `path`, if supported.
pub fn container_of(path: &Path) -> PaneviewResult<String> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if VIDEO_CONTAINERS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(PaneviewError::export(format!(
            "unsupported video container '{}' (expected one of: {})",
            ext,
            VIDEO_CONTAINERS.join(", ")
        )))
    }
}

/// Encoder selected by a four-character codec tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Mpeg4,
    H264,
    MotionJpeg,
    Xvid,
}

impl Codec {
    /// Case-insensitive lookup of a fourcc tag.
    pub fn from_fourcc(tag: &str) -> PaneviewResult<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "mp4v" => Ok(Self::Mpeg4),
            "avc1" | "h264" => Ok(Self::H264),
            "mjpg" => Ok(Self::MotionJpeg),
            "xvid" => Ok(Self::Xvid),
            other => Err(PaneviewError::export(format!("unknown codec tag '{other}'"))),
        }
    }

    /// ffmpeg arguments selecting this encoder and its pixel format.
    pub fn ffmpeg_args(self) -> &'static [&'static str] {
        match self {
            Self::Mpeg4 => &["-c:v", "mpeg4", "-pix_fmt", "yuv420p"],
            Self::H264 => &["-c:v", "libx264", "-pix_fmt", "yuv420p"],
            Self::MotionJpeg => &["-c:v", "mjpeg", "-pix_fmt", "yuvj420p"],
            Self::Xvid => &["-c:v", "mpeg4", "-vtag", "xvid", "-pix_fmt", "yuv420p"],
        }
    }
}

/// One open output stream.
pub trait VideoEncoder: Send {
    /// Append a frame. Frames must match the dimensions the stream was
    /// opened with.
    fn write_frame(&mut self, frame: &RgbImage) -> PaneviewResult<()>;

    /// Flush and close the stream.
    fn finish(self: Box<Self>) -> PaneviewResult<()>;
}

/// Factory for encoders (ffmpeg, in-memory, ...).
pub trait VideoBackend: Send + Sync {
    fn open(&self, spec: &VideoSpec) -> PaneviewResult<Box<dyn VideoEncoder>>;

    /// Check if this backend can run on this system.
    fn is_available(&self) -> bool;

    /// Backend name.
    fn name(&self) -> &str;
}

/// Encodes through an `ffmpeg` child process.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    binary: String,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self {
            binary: "ffmpeg".to_string(),
        }
    }
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific ffmpeg executable instead of the one on `PATH`.
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Full argument list for `spec`, excluding the binary.
    pub fn command_args(spec: &VideoSpec) -> PaneviewResult<Vec<String>> {
        let codec = Codec::from_fourcc(&spec.fourcc)?;
        let mut args: Vec<String> = [
            "-y",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-s",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{}x{}", spec.width, spec.height));
        args.push("-r".to_string());
        args.push(format!("{}", spec.fps));
        args.extend(["-i", "pipe:0", "-an"].iter().map(|s| s.to_string()));
        // yuv420 output needs even dimensions.
        args.extend(
            ["-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.extend(codec.ffmpeg_args().iter().map(|s| s.to_string()));
        args.push(spec.output_path.to_string_lossy().into_owned());
        Ok(args)
    }
}

impl VideoBackend for FfmpegBackend {
    fn open(&self, spec: &VideoSpec) -> PaneviewResult<Box<dyn VideoEncoder>> {
        spec.validate()?;
        if !self.is_available() {
            return Err(PaneviewError::export(format!(
                "{} was not found; it is required for video export",
                self.binary
            )));
        }

        let args = Self::command_args(spec)?;
        tracing::debug!(args = ?args, "Starting ffmpeg");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PaneviewError::export(format!("failed to start ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PaneviewError::export("failed to open ffmpeg stdin"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| PaneviewError::export("failed to capture ffmpeg stderr"))?;

        // Drained on a thread so ffmpeg never blocks on a full stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut output = String::new();
            match BufReader::new(stderr).read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        tracing::info!(
            pid = child.id(),
            output = %spec.output_path.display(),
            fourcc = %spec.fourcc,
            "ffmpeg process started"
        );

        Ok(Box::new(FfmpegEncoder {
            width: spec.width,
            height: spec.height,
            child: Some(child),
            stdin: Some(stdin),
            stderr_task: Some(stderr_task),
        }))
    }

    fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

struct FfmpegEncoder {
    width: u32,
    height: u32,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_task: Option<JoinHandle<String>>,
}

impl FfmpegEncoder {
    fn stderr_output(&mut self) -> String {
        self.stderr_task
            .take()
            .and_then(|task| task.join().ok())
            .unwrap_or_default()
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> PaneviewResult<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(PaneviewError::export(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )));
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PaneviewError::export("ffmpeg encoder is already finalized"));
        };
        stdin
            .write_all(frame.as_raw())
            .map_err(|e| PaneviewError::export(format!("failed to write frame to ffmpeg: {e}")))
    }

    fn finish(mut self: Box<Self>) -> PaneviewResult<()> {
        drop(self.stdin.take());

        let Some(child) = self.child.take() else {
            return Err(PaneviewError::export("ffmpeg encoder is already finalized"));
        };
        let output = child
            .wait_with_output()
            .map_err(|e| PaneviewError::export(format!("failed to wait on ffmpeg: {e}")))?;
        let stderr = self.stderr_output();

        if !output.status.success() {
            return Err(PaneviewError::export(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegEncoder {
    fn drop(&mut self) {
        // Reached without finish() only on an aborted export.
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        let _ = self.stderr_output();
    }
}
