//! Playback state machine.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use paneview_common::error::{PaneviewError, PaneviewResult};
use paneview_project_model::{clamp_frame, FpsSetting, FALLBACK_FRAME_DELAY};

/// Playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
}

/// Messages posted by the playback worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The frame index advanced; redraw this frame.
    Tick { frame_index: usize },
    /// The worker exited.
    Stopped,
}

/// Result of [`PlaybackController::start`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyPlaying,
    /// Nothing to play; state is unchanged.
    NoFrames,
}

const STOPPED: u64 = 0;

/// State read by both the controller and its worker.
#[derive(Debug)]
struct Shared {
    /// Id of the run allowed to tick, or [`STOPPED`]. A worker whose id
    /// is no longer here exits without ticking again.
    active_run: AtomicU64,
    /// Last run id handed out.
    last_run: AtomicU64,
    frame_index: AtomicUsize,
    max_frames: AtomicUsize,
    fps: Mutex<FpsSetting>,
}

/// Owns the playing flag, frame index, and fps, and the ticking worker.
pub struct PlaybackController {
    shared: Arc<Shared>,
    events: Sender<PlaybackEvent>,
    worker: Option<JoinHandle<()>>,
}

impl PlaybackController {
    /// Controller posting its events on `events`.
    pub fn new(events: Sender<PlaybackEvent>) -> Self {
        Self {
            shared: Arc::new(Shared {
                active_run: AtomicU64::new(STOPPED),
                last_run: AtomicU64::new(STOPPED),
                frame_index: AtomicUsize::new(0),
                max_frames: AtomicUsize::new(0),
                fps: Mutex::new(FpsSetting::default()),
            }),
            events,
            worker: None,
        }
    }

    /// Controller plus the receiving end of its event channel.
    pub fn channel() -> (Self, Receiver<PlaybackEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(tx), rx)
    }

    pub fn state(&self) -> PlaybackState {
        if self.is_playing() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    pub fn is_playing(&self) -> bool {
        self.shared.active_run.load(Ordering::SeqCst) != STOPPED
    }

    pub fn frame_index(&self) -> usize {
        self.shared.frame_index.load(Ordering::SeqCst)
    }

    pub fn max_frames(&self) -> usize {
        self.shared.max_frames.load(Ordering::SeqCst)
    }

    pub fn fps(&self) -> FpsSetting {
        self.shared
            .fps
            .lock()
            .map(|fps| fps.clone())
            .unwrap_or_default()
    }

    /// Change the rate. A running worker picks it up on its next tick.
    pub fn set_fps(&self, fps: FpsSetting) {
        if fps.value().is_none() {
            tracing::warn!(fps = %fps, "Unusable fps; playback will use the fallback delay");
        }
        if let Ok(mut slot) = self.shared.fps.lock() {
            *slot = fps;
        }
    }

    /// Update the frame count after panes change, clamping the position.
    pub fn set_max_frames(&self, max_frames: usize) {
        self.shared.max_frames.store(max_frames, Ordering::SeqCst);
        let clamped = clamp_frame(self.frame_index(), max_frames);
        self.shared.frame_index.store(clamped, Ordering::SeqCst);
    }

    /// Jump to `frame_index`, clamped into range. Returns the new position.
    pub fn seek(&self, frame_index: usize) -> usize {
        let clamped = clamp_frame(frame_index, self.max_frames());
        self.shared.frame_index.store(clamped, Ordering::SeqCst);
        clamped
    }

    /// Start playing at `fps`.
    pub fn start(&mut self, fps: FpsSetting) -> PaneviewResult<StartOutcome> {
        self.set_fps(fps);
        self.play()
    }

    /// Stop if playing, otherwise start at the current fps. Returns the
    /// resulting state.
    pub fn toggle(&mut self) -> PaneviewResult<PlaybackState> {
        if !self.stop() {
            self.play()?;
        }
        Ok(self.state())
    }

    /// Ask the worker to exit. Returns whether playback was running.
    ///
    /// The worker notices within one frame period and then posts
    /// [`PlaybackEvent::Stopped`].
    pub fn stop(&mut self) -> bool {
        let was_playing = self.shared.active_run.swap(STOPPED, Ordering::SeqCst) != STOPPED;
        if was_playing {
            tracing::info!(frame = self.frame_index(), "Playback stopped");
        }
        was_playing
    }

    fn play(&mut self) -> PaneviewResult<StartOutcome> {
        if self.is_playing() {
            return Ok(StartOutcome::AlreadyPlaying);
        }
        if self.max_frames() == 0 {
            tracing::warn!("No frames to play");
            return Ok(StartOutcome::NoFrames);
        }

        let run = self.shared.last_run.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.active_run.store(run, Ordering::SeqCst);

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let spawned = std::thread::Builder::new()
            .name("paneview-playback".to_string())
            .spawn(move || run_worker(shared, events, run));

        match spawned {
            Ok(handle) => {
                // A previous worker, if any, exits on its own.
                self.worker = Some(handle);
                tracing::info!(
                    frame = self.frame_index(),
                    max_frames = self.max_frames(),
                    fps = %self.fps(),
                    "Playback started"
                );
                Ok(StartOutcome::Started)
            }
            Err(e) => {
                self.shared.release(run);
                Err(PaneviewError::Io(e))
            }
        }
    }

    /// Stop and wait for the worker to exit.
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                tracing::error!("Playback worker panicked");
            }
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.shared.active_run.store(STOPPED, Ordering::SeqCst);
    }
}

impl Shared {
    /// Stop `run` unless a newer run has replaced it.
    fn release(&self, run: u64) {
        let _ = self.active_run.compare_exchange(
            run,
            STOPPED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

fn run_worker(shared: Arc<Shared>, events: Sender<PlaybackEvent>, run: u64) {
    loop {
        let delay = shared
            .fps
            .lock()
            .map(|fps| fps.frame_delay())
            .unwrap_or(FALLBACK_FRAME_DELAY);
        std::thread::sleep(delay);

        if shared.active_run.load(Ordering::SeqCst) != run {
            break;
        }

        let max_frames = shared.max_frames.load(Ordering::SeqCst);
        if max_frames == 0 {
            tracing::warn!("No frames left; stopping playback");
            shared.release(run);
            break;
        }

        let next = (shared.frame_index.load(Ordering::SeqCst) + 1) % max_frames;
        shared.frame_index.store(next, Ordering::SeqCst);
        tracing::trace!(frame = next, "Playback tick");

        if events.send(PlaybackEvent::Tick { frame_index: next }).is_err() {
            tracing::debug!("Event receiver dropped; stopping playback");
            shared.release(run);
            return;
        }
    }

    // A newer run owns the event stream; only the latest run reports.
    if shared.last_run.load(Ordering::SeqCst) == run {
        let _ = events.send(PlaybackEvent::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::{Duration, Instant};

    const WAIT: Duration = Duration::from_secs(5);

    fn next_tick(rx: &Receiver<PlaybackEvent>) -> usize {
        match rx.recv_timeout(WAIT).unwrap() {
            PlaybackEvent::Tick { frame_index } => frame_index,
            other => panic!("expected tick, got {other:?}"),
        }
    }

    #[test]
    fn test_start_without_frames_is_noop() {
        let (mut controller, _rx) = PlaybackController::channel();
        let outcome = controller.start(FpsSetting::from(5)).unwrap();
        assert_eq!(outcome, StartOutcome::NoFrames);
        assert_eq!(controller.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_ticks_wrap_around() {
        let (mut controller, rx) = PlaybackController::channel();
        controller.set_max_frames(3);
        assert_eq!(
            controller.start(FpsSetting::from(200)).unwrap(),
            StartOutcome::Started
        );
        assert_eq!(
            controller.start(FpsSetting::from(200)).unwrap(),
            StartOutcome::AlreadyPlaying
        );

        let ticks: Vec<usize> = (0..4).map(|_| next_tick(&rx)).collect();
        assert_eq!(ticks, vec![1, 2, 0, 1]);

        assert!(controller.stop());
        loop {
            if rx.recv_timeout(WAIT).unwrap() == PlaybackEvent::Stopped {
                break;
            }
        }
        assert_eq!(controller.state(), PlaybackState::Stopped);
        controller.shutdown();
    }

    #[test]
    fn test_worker_stops_when_frames_vanish() {
        let (mut controller, rx) = PlaybackController::channel();
        controller.set_max_frames(2);
        controller.start(FpsSetting::from(200)).unwrap();
        next_tick(&rx);

        controller.set_max_frames(0);
        loop {
            if rx.recv_timeout(WAIT).unwrap() == PlaybackEvent::Stopped {
                break;
            }
        }
        assert!(!controller.is_playing());
        controller.shutdown();
    }

    #[test]
    fn test_toggle() {
        let (mut controller, _rx) = PlaybackController::channel();
        controller.set_max_frames(4);
        controller.set_fps(FpsSetting::from(100));
        assert_eq!(controller.toggle().unwrap(), PlaybackState::Playing);
        assert_eq!(controller.toggle().unwrap(), PlaybackState::Stopped);

        controller.set_max_frames(0);
        assert_eq!(controller.toggle().unwrap(), PlaybackState::Stopped);
        controller.shutdown();
    }

    #[test]
    fn test_seek_and_max_frames_clamp() {
        let (controller, _rx) = PlaybackController::channel();
        assert_eq!(controller.seek(3), 0);
        controller.set_max_frames(10);
        assert_eq!(controller.seek(7), 7);
        assert_eq!(controller.seek(99), 9);
        controller.set_max_frames(5);
        assert_eq!(controller.frame_index(), 4);
    }

    #[test]
    fn test_fps_is_stored() {
        let (controller, _rx) = PlaybackController::channel();
        controller.set_fps(FpsSetting::text("abc"));
        assert_eq!(controller.fps(), FpsSetting::text("abc"));
    }

    #[test]
    fn test_restart_keeps_a_single_ticker() {
        let (mut controller, rx) = PlaybackController::channel();
        controller.set_max_frames(1000);
        // 50 ms per frame.
        controller.start(FpsSetting::from(20)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        controller.stop();
        controller.start(FpsSetting::from(20)).unwrap();

        // One period plus slack: a lone worker ticks at most once in here.
        let deadline = Instant::now() + Duration::from_millis(75);
        let mut ticks = 0;
        while let Some(left) = deadline.checked_duration_since(Instant::now()) {
            match rx.recv_timeout(left) {
                Ok(PlaybackEvent::Tick { .. }) => ticks += 1,
                Ok(PlaybackEvent::Stopped) => panic!("replaced run reported Stopped"),
                Err(_) => break,
            }
        }
        assert!(ticks <= 1, "got {ticks} ticks from one period");
        assert!(controller.is_playing());
        controller.shutdown();
    }

    proptest! {
        #[test]
        fn prop_seek_stays_in_range(max in 0usize..500, target in 0usize..1000) {
            let (controller, _rx) = PlaybackController::channel();
            controller.set_max_frames(max);
            let at = controller.seek(target);
            prop_assert!(at < max.max(1));
        }
    }
}
