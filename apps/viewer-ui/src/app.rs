use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use eframe::egui::{self, Color32};
use paneview_catalog::{suggest_pattern, PaneStatus, Workspace};
use paneview_common::config::AppConfig;
use paneview_playback_engine::{PlaybackController, PlaybackEvent, PlaybackState, StartOutcome};
use paneview_project_model::{frame_label, FpsSetting, LayoutSpec, LAYOUT_PRESETS};
use paneview_render_engine::{
    render_composite, CanvasSize, ExportEngine, VideoExportJob, STILL_FORMATS, VIDEO_CONTAINERS,
};

use crate::export_worker::{spawn_video_export, ExportMessage};

/// Edits collected while drawing the pane list, applied afterwards.
enum PaneAction {
    SetPattern(usize, String),
    SetEnabled(usize, bool),
    BrowsePattern(usize),
}

pub struct ViewerApp {
    config: AppConfig,
    workspace: Workspace,
    playback: PlaybackController,
    playback_events: Receiver<PlaybackEvent>,
    canvas: CanvasSize,
    fourcc: String,
    base_dir_input: String,
    layout_input: String,
    fps_input: String,
    pattern_inputs: Vec<String>,
    preview: Option<egui::TextureHandle>,
    preview_frame: Option<usize>,
    preview_dirty: bool,
    export_receiver: Option<Receiver<ExportMessage>>,
    export_percent: f64,
    status: String,
}

impl ViewerApp {
    pub fn new(config: AppConfig) -> Self {
        let defaults = &config.defaults;
        let layout = defaults.layout.parse::<LayoutSpec>().unwrap_or_else(|e| {
            tracing::warn!(error = %e, layout = %defaults.layout, "Bad default layout");
            LayoutSpec::SINGLE
        });

        let mut workspace = Workspace::new(layout);
        workspace.set_fps(FpsSetting::from(defaults.fps));
        if config.initial_base_dir.is_dir() {
            workspace.set_base_directory(config.initial_base_dir.clone());
        }

        let (playback, playback_events) = PlaybackController::channel();
        playback.set_fps(workspace.fps().clone());

        let mut app = Self {
            base_dir_input: config.initial_base_dir.display().to_string(),
            layout_input: layout.to_string(),
            fps_input: workspace.fps().to_string(),
            pattern_inputs: Vec::new(),
            canvas: CanvasSize::new(defaults.canvas_width, defaults.canvas_height),
            fourcc: defaults.video_fourcc.clone(),
            workspace,
            playback,
            playback_events,
            preview: None,
            preview_frame: None,
            preview_dirty: true,
            export_receiver: None,
            export_percent: 0.0,
            status: "Ready".to_string(),
            config,
        };
        app.panes_changed();
        app
    }

    /// Push pane-derived state into playback and the inputs.
    fn panes_changed(&mut self) {
        self.playback.set_max_frames(self.workspace.max_frames());
        self.pattern_inputs = self
            .workspace
            .panes()
            .panes()
            .iter()
            .map(|p| p.pattern.clone())
            .collect();
        self.preview_dirty = true;
    }

    fn sync_inputs_from_workspace(&mut self) {
        self.base_dir_input = self
            .workspace
            .base_directory()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        self.layout_input = self.workspace.layout().to_string();
        self.fps_input = self.workspace.fps().to_string();
        self.playback.set_fps(self.workspace.fps().clone());
        self.panes_changed();
    }

    fn apply_base_directory(&mut self, dir: PathBuf) {
        if !dir.is_dir() {
            self.status = format!("Not a directory: {}", dir.display());
            return;
        }
        self.base_dir_input = dir.display().to_string();
        self.workspace.set_base_directory(dir);
        self.panes_changed();
        self.status = format!("{} frames", self.workspace.max_frames());
    }

    fn apply_layout(&mut self) {
        match self.layout_input.parse::<LayoutSpec>() {
            Ok(layout) => {
                self.playback.stop();
                self.workspace.set_layout(layout);
                self.panes_changed();
                self.status = format!("Layout {layout}");
            }
            Err(e) => self.status = e.to_string(),
        }
    }

    fn apply_fps(&mut self) {
        let fps = match self.fps_input.trim().parse::<u32>() {
            Ok(n) => FpsSetting::from(n),
            Err(_) => FpsSetting::text(self.fps_input.trim()),
        };
        self.workspace.set_fps(fps.clone());
        self.playback.set_fps(fps);
    }

    fn apply_pane_action(&mut self, action: PaneAction) {
        match action {
            PaneAction::SetPattern(index, pattern) => {
                self.workspace.set_pattern(index, pattern);
            }
            PaneAction::SetEnabled(index, enabled) => {
                self.workspace.set_enabled(index, enabled);
            }
            PaneAction::BrowsePattern(index) => {
                let Some(base) = self.workspace.base_directory().map(|d| d.to_path_buf()) else {
                    self.status = "Choose a base directory first".to_string();
                    return;
                };
                let Some(example) = rfd::FileDialog::new().set_directory(&base).pick_file() else {
                    return;
                };
                let pattern = suggest_pattern(&base, &example);
                self.workspace.set_pattern(index, pattern);
            }
        }
        self.panes_changed();
    }

    fn toggle_playback(&mut self) {
        self.apply_fps();
        if self.playback.is_playing() {
            self.playback.stop();
            return;
        }
        match self.playback.start(self.workspace.fps().clone()) {
            Ok(StartOutcome::NoFrames) => self.status = "No files to play".to_string(),
            Ok(_) => self.status = "Playing".to_string(),
            Err(e) => self.status = format!("Playback failed: {e}"),
        }
    }

    fn save_project(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json"])
            .set_file_name("paneview.json")
            .save_file()
        else {
            return;
        };
        self.status = match self.workspace.save_project_file(&path) {
            Ok(()) => format!("Saved {}", path.display()),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    fn load_project(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Project", &["json"])
            .pick_file()
        else {
            return;
        };
        self.playback.stop();
        match self.workspace.load_project_file(&path) {
            Ok(()) => {
                self.sync_inputs_from_workspace();
                self.status = format!("Loaded {}", path.display());
            }
            Err(e) => self.status = format!("Load failed: {e}"),
        }
    }

    fn export_frame(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Image", STILL_FORMATS)
            .set_file_name("frame.png")
            .save_file()
        else {
            return;
        };
        let engine = ExportEngine::default();
        self.status = match engine.export_frame(
            &path,
            self.playback.frame_index(),
            self.canvas,
            self.workspace.panes().panes(),
            self.workspace.layout(),
        ) {
            Ok(output) => format!("Frame exported: {}", output.display()),
            Err(e) => format!("Export failed: {e}"),
        };
    }

    fn export_video(&mut self) {
        if self.export_receiver.is_some() {
            return;
        }
        self.apply_fps();
        let Some(fps) = self.workspace.fps().value() else {
            self.status = "Export failed: fps must be a positive number".to_string();
            return;
        };
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Video", VIDEO_CONTAINERS)
            .set_file_name("paneview.mp4")
            .save_file()
        else {
            return;
        };

        let job = VideoExportJob {
            output_path: path,
            fps,
            fourcc: self.fourcc.clone(),
            canvas: self.canvas,
            layout: self.workspace.layout(),
            panes: self.workspace.snapshot(),
        };
        self.export_percent = 0.0;
        self.status = "Export started...".to_string();
        self.export_receiver = Some(spawn_video_export(job));
    }

    fn poll_playback_events(&mut self) {
        while let Ok(event) = self.playback_events.try_recv() {
            match event {
                PlaybackEvent::Tick { .. } => self.preview_dirty = true,
                PlaybackEvent::Stopped => {
                    tracing::debug!("Playback worker exited");
                }
            }
        }
    }

    fn poll_export_messages(&mut self) {
        let Some(receiver) = self.export_receiver.as_ref() else {
            return;
        };

        loop {
            match receiver.try_recv() {
                Ok(ExportMessage::Progress(p)) => {
                    self.export_percent = p.progress;
                    self.status = format!(
                        "Exporting {:.1}% ({} / {} frames, ETA {:.0}s)",
                        p.progress * 100.0,
                        p.frames_rendered,
                        p.total_frames,
                        p.eta_secs
                    );
                }
                Ok(ExportMessage::Complete { output }) => {
                    self.status = format!("Video exported: {}", output.display());
                    self.export_receiver = None;
                    break;
                }
                Ok(ExportMessage::Failed { error }) => {
                    self.status = error;
                    self.export_receiver = None;
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.status = "Export worker disconnected".to_string();
                    self.export_receiver = None;
                    break;
                }
            }
        }
    }

    fn refresh_preview(&mut self, ctx: &egui::Context) {
        let frame_index = self.playback.frame_index();
        if !self.preview_dirty && self.preview_frame == Some(frame_index) {
            return;
        }

        let frame = render_composite(
            frame_index,
            self.workspace.panes().panes(),
            self.workspace.layout(),
            self.canvas,
        );
        let size = [frame.width() as usize, frame.height() as usize];
        let image = egui::ColorImage::from_rgb(size, frame.as_raw());
        match self.preview.as_mut() {
            Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
            None => {
                self.preview =
                    Some(ctx.load_texture("composite", image, egui::TextureOptions::LINEAR));
            }
        }
        self.preview_frame = Some(frame_index);
        self.preview_dirty = false;
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        ui.heading("Paneview");
        ui.separator();

        ui.label("Base directory");
        ui.horizontal(|ui| {
            let response = ui.text_edit_singleline(&mut self.base_dir_input);
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if submitted || ui.button("Set").clicked() {
                let dir = PathBuf::from(self.base_dir_input.trim());
                self.apply_base_directory(dir);
            }
            if ui.button("Browse").clicked() {
                if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                    self.apply_base_directory(dir);
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Layout");
            let mut chosen = false;
            egui::ComboBox::from_id_source("layout_presets")
                .selected_text(self.layout_input.clone())
                .show_ui(ui, |ui| {
                    for preset in LAYOUT_PRESETS {
                        chosen |= ui
                            .selectable_value(&mut self.layout_input, preset.to_string(), preset)
                            .clicked();
                    }
                });
            let response =
                ui.add(egui::TextEdit::singleline(&mut self.layout_input).desired_width(50.0));
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if chosen || submitted || ui.button("Apply").clicked() {
                self.apply_layout();
            }
        });

        ui.horizontal(|ui| {
            ui.label("FPS");
            if ui
                .add(egui::TextEdit::singleline(&mut self.fps_input).desired_width(50.0))
                .changed()
            {
                self.apply_fps();
            }
        });

        ui.separator();
        let mut actions = Vec::new();
        egui::ScrollArea::vertical()
            .max_height(ui.available_height() - 80.0)
            .show(ui, |ui| {
                for index in 0..self.pattern_inputs.len() {
                    self.pane_row_ui(ui, index, &mut actions);
                }
            });
        for action in actions {
            self.apply_pane_action(action);
        }

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Refresh All").clicked() {
                self.workspace.refresh_all();
                self.panes_changed();
            }
            if ui.button("Save Config").clicked() {
                self.save_project();
            }
            if ui.button("Load Config").clicked() {
                self.load_project();
            }
        });
    }

    fn pane_row_ui(&mut self, ui: &mut egui::Ui, index: usize, actions: &mut Vec<PaneAction>) {
        let Some(pane) = self.workspace.panes().get(index) else {
            return;
        };
        let mut enabled = pane.enabled;
        let status = self.workspace.status(index).cloned().unwrap_or_default();

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(format!("Pane {}", index + 1));
                if ui.checkbox(&mut enabled, "Enabled").changed() {
                    actions.push(PaneAction::SetEnabled(index, enabled));
                }
            });
            ui.horizontal(|ui| {
                let input = &mut self.pattern_inputs[index];
                let response = ui.add(egui::TextEdit::singleline(input).hint_text("*.png"));
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submitted || ui.button("Set").clicked() {
                    actions.push(PaneAction::SetPattern(index, input.clone()));
                }
                if ui.button("Browse").clicked() {
                    actions.push(PaneAction::BrowsePattern(index));
                }
            });
            let color = match status {
                PaneStatus::Error(_) => Color32::from_rgb(230, 90, 90),
                PaneStatus::Disabled => Color32::GRAY,
                _ => Color32::from_rgb(140, 200, 140),
            };
            ui.colored_label(color, status.to_string());
        });
    }

    fn transport_ui(&mut self, ui: &mut egui::Ui) {
        let max_frames = self.workspace.max_frames();
        ui.horizontal(|ui| {
            let label = match self.playback.state() {
                PlaybackState::Playing => "Stop",
                PlaybackState::Stopped => "Play",
            };
            if ui.button(label).clicked() {
                self.toggle_playback();
            }
            if ui.button("<").clicked() {
                self.playback.seek(self.playback.frame_index().saturating_sub(1));
            }
            if ui.button(">").clicked() {
                self.playback.seek(self.playback.frame_index() + 1);
            }

            let mut frame_index = self.playback.frame_index();
            let last = max_frames.saturating_sub(1);
            let slider = egui::Slider::new(&mut frame_index, 0..=last).show_value(false);
            if ui.add_enabled(max_frames > 0, slider).changed() {
                self.playback.seek(frame_index);
            }
            ui.label(frame_label(self.playback.frame_index(), max_frames));

            ui.separator();
            if ui.button("Export Frame").clicked() {
                self.export_frame();
            }
            let exporting = self.export_receiver.is_some();
            if ui
                .add_enabled(!exporting, egui::Button::new("Export Video"))
                .clicked()
            {
                self.export_video();
            }
            if exporting {
                ui.add(
                    egui::ProgressBar::new(self.export_percent as f32)
                        .desired_width(160.0)
                        .show_percentage(),
                );
            }
        });
        ui.label(format!("Status: {}", self.status));
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let repaint = if self.playback.is_playing() { 30 } else { 100 };
        ctx.request_repaint_after(Duration::from_millis(repaint));
        self.poll_playback_events();
        self.poll_export_messages();

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| self.controls_ui(ui));

        egui::TopBottomPanel::bottom("transport").show(ctx, |ui| self.transport_ui(ui));

        self.refresh_preview(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(Color32::BLACK))
            .show(ctx, |ui| {
                if let Some(texture) = self.preview.as_ref() {
                    ui.centered_and_justified(|ui| {
                        ui.add(egui::Image::new(texture).shrink_to_fit());
                    });
                }
            });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.playback.shutdown();

        // Reopen where the user left off.
        if let Some(dir) = self.workspace.base_directory() {
            self.config.initial_base_dir = dir.to_path_buf();
            if let Err(e) = self.config.save() {
                tracing::warn!(error = %e, "Failed to save app config");
            }
        }
    }
}
