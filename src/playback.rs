use crate::audio::AudioEngine;
use crate::error::PlayerError;
use crate::model::{PlaybackState, VOLUME_STEP};
use std::path::{Path, PathBuf};

/// Outcome of the pause control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseToggle {
    Paused,
    Resumed,
    Idle,
}

/// Applies one volume step, clamped to `[0.0, 1.0]`. The result is rounded
/// to 1e-6 so repeated steps do not accumulate float drift.
pub fn step_volume(volume: f32, up: bool) -> f32 {
    let delta = if up { VOLUME_STEP } else { -VOLUME_STEP };
    let stepped = (volume + delta).clamp(0.0, 1.0);
    (stepped * 1e6).round() / 1e6
}

/// Tracks what the engine is doing on behalf of the dispatcher.
pub struct PlaybackController<E: AudioEngine> {
    engine: E,
    now_playing: Option<PathBuf>,
    paused: bool,
}

impl<E: AudioEngine> PlaybackController<E> {
    pub fn new(engine: E, volume: f32) -> Self {
        let mut controller = Self {
            engine,
            now_playing: None,
            paused: false,
        };
        controller.engine.set_volume(volume);
        controller
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn now_playing(&self) -> Option<&Path> {
        self.now_playing.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn state(&self) -> PlaybackState {
        if self.paused {
            PlaybackState::Paused
        } else if self.engine.is_busy() {
            PlaybackState::Playing
        } else {
            PlaybackState::Stopped
        }
    }

    /// Loads and starts `path`. On failure nothing about the current track changes.
    pub fn play_song(&mut self, path: &Path) -> Result<(), PlayerError> {
        self.engine
            .load(path)
            .map_err(|err| PlayerError::PlaybackLoadFailed {
                name: display_name(path),
                reason: format!("{err:#}"),
            })?;
        self.engine.play();
        self.now_playing = Some(path.to_path_buf());
        self.paused = false;
        tracing::info!("playing {}", path.display());
        Ok(())
    }

    pub fn toggle_pause(&mut self) -> PauseToggle {
        if self.engine.is_busy() {
            self.engine.pause();
            self.paused = true;
            PauseToggle::Paused
        } else if self.paused {
            self.engine.resume();
            self.paused = false;
            PauseToggle::Resumed
        } else {
            PauseToggle::Idle
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.engine.set_volume(volume);
    }

    /// Non-blocking check of the completion signal.
    pub fn poll_finished(&mut self) -> bool {
        if !self.engine.take_finished() {
            return false;
        }
        if let Some(path) = self.now_playing.take() {
            tracing::debug!("finished {}", path.display());
        }
        self.paused = false;
        true
    }

    pub fn shutdown(&mut self) {
        self.engine.stop();
        self.now_playing = None;
        self.paused = false;
    }
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
