#![allow(dead_code)]

use anyhow::bail;
use dirplay::audio::AudioEngine;
use dirplay::config::ConfigStore;
use dirplay::core::Player;
use dirplay::metadata::FileNameDescriber;
use dirplay::model::Config;
use dirplay::playlist::PlaylistSession;
use dirplay::ui::{Frame, Renderer};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Engine double whose tracks only end when the test says so.
#[derive(Debug, Default)]
pub struct ScriptedEngine {
    pub loaded: Option<PathBuf>,
    pub busy: bool,
    pub paused: bool,
    pub volume: f32,
    pub played: Vec<PathBuf>,
    pub failing: Vec<PathBuf>,
    finished: bool,
}

impl ScriptedEngine {
    pub fn finish_track(&mut self) {
        self.busy = false;
        self.finished = true;
    }
}

impl AudioEngine for ScriptedEngine {
    fn load(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.failing.iter().any(|failing| failing == path) {
            bail!("unrecognized audio format");
        }
        self.loaded = Some(path.to_path_buf());
        self.busy = false;
        self.finished = false;
        Ok(())
    }

    fn play(&mut self) {
        if let Some(path) = &self.loaded {
            self.played.push(path.clone());
            self.busy = true;
            self.paused = false;
        }
    }

    fn pause(&mut self) {
        self.busy = false;
        self.paused = true;
    }

    fn resume(&mut self) {
        self.busy = self.loaded.is_some();
        self.paused = false;
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.busy = false;
        self.paused = false;
        self.finished = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn take_finished(&mut self) -> bool {
        std::mem::take(&mut self.finished)
    }
}

pub struct Library {
    pub dir: TempDir,
    pub root: PathBuf,
}

impl Library {
    pub fn new(folders: &[&str], files: &[&str]) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("music");
        fs::create_dir_all(&root).expect("music root");
        for folder in folders {
            fs::create_dir_all(root.join(folder)).expect("folder");
        }
        for file in files {
            let path = root.join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("parent");
            }
            fs::write(&path, b"fake audio").expect("track");
        }
        Self { dir, root }
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("dirplay.json")
    }

    pub fn player(&self) -> Player<ScriptedEngine> {
        self.player_with(Config::default())
    }

    pub fn player_with(&self, config: Config) -> Player<ScriptedEngine> {
        let config = Config {
            music_folder: self.root.clone(),
            ..config
        };
        let store = ConfigStore::in_memory(self.config_path(), config);
        Player::new(store, ScriptedEngine::default(), Box::new(FileNameDescriber))
            .with_session(PlaylistSession::with_seed(42))
    }
}

pub fn numbered_tracks(count: usize) -> Vec<String> {
    (1..=count).map(|n| format!("{n:02}.mp3")).collect()
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<Frame>,
    pub prompts: Vec<String>,
    pub notices: Vec<String>,
    pub welcomes: Vec<PathBuf>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &Frame) -> anyhow::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn welcome(&mut self, last_folder: &Path) -> anyhow::Result<()> {
        self.welcomes.push(last_folder.to_path_buf());
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> anyhow::Result<()> {
        self.prompts.push(text.to_string());
        Ok(())
    }

    fn notice(&mut self, text: &str) -> anyhow::Result<()> {
        self.notices.push(text.to_string());
        Ok(())
    }
}
