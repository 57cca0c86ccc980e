use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_music_folder")]
    pub music_folder: PathBuf,
    #[serde(default = "default_volume")]
    pub volume: f32,
    #[serde(default)]
    pub shuffle_on: bool,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub current_page: usize,
}

fn default_music_folder() -> PathBuf {
    PathBuf::from("audio")
}

fn default_volume() -> f32 {
    0.5
}

fn default_page_size() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            music_folder: default_music_folder(),
            volume: default_volume(),
            shuffle_on: false,
            page_size: default_page_size(),
            current_page: 0,
        }
    }
}

impl Config {
    /// Brings hand-edited values back inside their valid ranges.
    pub fn sanitize(&mut self) {
        self.volume = if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            default_volume()
        };
        if self.page_size == 0 {
            self.page_size = default_page_size();
        }
    }
}

/// One numbered line of the browser menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Parent,
    Folder(PathBuf),
    Track(PathBuf),
}

impl MenuEntry {
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Parent | Self::Folder(_) => "DIR",
            Self::Track(_) => "SONG",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}
