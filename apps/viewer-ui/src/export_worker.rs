//! Background video export.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};

use paneview_render_engine::{ExportEngine, ExportProgress, ProgressCallback, VideoExportJob};

#[derive(Debug)]
pub enum ExportMessage {
    Progress(ExportProgress),
    Complete { output: PathBuf },
    Failed { error: String },
}

/// Run `job` on its own thread. The job already holds its pane snapshot.
pub fn spawn_video_export(job: VideoExportJob) -> Receiver<ExportMessage> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        let tx_progress = tx.clone();
        let progress_cb: ProgressCallback = Box::new(move |p| {
            let _ = tx_progress.send(ExportMessage::Progress(p));
        });

        let engine = ExportEngine::default();
        tracing::info!(
            backend = engine.backend_name(),
            output = %job.output_path.display(),
            frames = job.total_frames(),
            "Video export started"
        );
        match engine.export_video(&job, Some(progress_cb)) {
            Ok(output) => {
                let _ = tx.send(ExportMessage::Complete { output });
            }
            Err(err) => {
                let _ = tx.send(ExportMessage::Failed {
                    error: err.to_string(),
                });
            }
        }
    });

    rx
}
