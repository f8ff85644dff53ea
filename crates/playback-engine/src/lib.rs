//! Paneview Playback Engine
//!
//! Advances the shared frame index on a background thread at the
//! configured fps. The worker never touches UI state: each step is posted
//! as a [`PlaybackEvent`] on a channel the UI drains.

pub mod controller;

pub use controller::*;
