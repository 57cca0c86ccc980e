use crate::audio::AudioEngine;
use crate::browser::{self, DirectoryListing, ItemIndex};
use crate::config::{self, ConfigStore};
use crate::error::PlayerError;
use crate::metadata::TrackDescriber;
use crate::model::{Config, MenuEntry};
use crate::playback::{self, PauseToggle, PlaybackController};
use crate::playlist::PlaylistSession;
use crate::queue::TrackQueue;
use std::ops::Range;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Select(usize),
    Add(usize),
    Clear,
    VolumeUp,
    VolumeDown,
    TogglePause,
    Next,
    Previous,
    ShuffleAndPlay,
    ToggleShuffle,
    NextPage,
    PreviousPage,
    Quit,
}

/// A parsed input line. `add` on its own asks for a second line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    AddPrompt,
}

pub fn parse_input(raw: &str) -> Result<Input, PlayerError> {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line == " " {
        return Ok(Input::Command(Command::TogglePause));
    }

    let choice = line.trim().to_lowercase();
    let command = match choice.as_str() {
        "add" => return Ok(Input::AddPrompt),
        "clear" => Command::Clear,
        "+" => Command::VolumeUp,
        "-" => Command::VolumeDown,
        "pause" => Command::TogglePause,
        ">" => Command::Next,
        "<" => Command::Previous,
        "s" => Command::ShuffleAndPlay,
        "t" => Command::ToggleShuffle,
        "n" => Command::NextPage,
        "p" => Command::PreviousPage,
        "q" => Command::Quit,
        other => match other.strip_prefix("add ") {
            Some(rest) => parse_add_number(rest)?,
            None => Command::Select(other.parse().map_err(|_| {
                PlayerError::InvalidInput(String::from(
                    "Invalid input. Please enter a number or a valid command.",
                ))
            })?),
        },
    };
    Ok(Input::Command(command))
}

/// Parses the answer to the add prompt.
pub fn parse_add_number(raw: &str) -> Result<Command, PlayerError> {
    raw.trim().parse().map(Command::Add).map_err(|_| {
        PlayerError::InvalidInput(String::from("Invalid input. Please enter a valid number."))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything derived from the filesystem for one loop iteration.
#[derive(Debug, Clone)]
pub struct BrowseView {
    pub listing: DirectoryListing,
    pub view_playlist: Vec<PathBuf>,
    pub window: Range<usize>,
    pub items: ItemIndex,
}

impl BrowseView {
    pub fn audio_count(&self) -> usize {
        self.listing.audio_files.len()
    }
}

/// The player state machine: browsing position, playlist session, queue and
/// playback, driven one command at a time.
pub struct Player<E: AudioEngine> {
    store: ConfigStore,
    root: PathBuf,
    current_dir: PathBuf,
    queue: TrackQueue,
    session: PlaylistSession,
    playback: PlaybackController<E>,
    describer: Box<dyn TrackDescriber>,
    status: Option<String>,
}

impl<E: AudioEngine> Player<E> {
    pub fn new(store: ConfigStore, engine: E, describer: Box<dyn TrackDescriber>) -> Self {
        let root = config::normalize_path(&store.config.music_folder);
        let volume = store.config.volume;
        Self {
            store,
            current_dir: root.clone(),
            root,
            queue: TrackQueue::new(),
            session: PlaylistSession::new(),
            playback: PlaybackController::new(engine, volume),
            describer,
            status: None,
        }
    }

    pub fn with_session(mut self, session: PlaylistSession) -> Self {
        self.session = session;
        self
    }

    pub fn config(&self) -> &Config {
        &self.store.config
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn queue(&self) -> &TrackQueue {
        &self.queue
    }

    pub fn session(&self) -> &PlaylistSession {
        &self.session
    }

    pub fn playback(&self) -> &PlaybackController<E> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController<E> {
        &mut self.playback
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }

    pub fn describe(&self, path: &Path) -> String {
        self.describer.describe(path)
    }

    /// Makes `folder` the browsing root and remembers it as the music folder.
    pub fn open_folder(&mut self, folder: &Path) -> Result<(), PlayerError> {
        self.store.config.music_folder = folder.to_path_buf();
        self.persist();
        if !folder.is_dir() {
            return Err(PlayerError::InvalidSelection(format!(
                "The directory '{}' does not exist or is not a directory.",
                folder.display()
            )));
        }
        self.root = config::normalize_path(folder);
        self.current_dir = self.root.clone();
        tracing::info!("browsing {}", self.root.display());
        Ok(())
    }

    /// Reacts to the completion signal, if it fired. The queue head wins over
    /// the playlist.
    pub fn poll_completion(&mut self) -> bool {
        if !self.playback.poll_finished() {
            return false;
        }

        if let Ok(path) = self.queue.dequeue_next() {
            self.session.detach();
            self.play(&path);
        } else if let Some(path) = self.session.advance_after_completion().map(Path::to_path_buf) {
            self.play(&path);
        }
        true
    }

    pub fn refresh(&self) -> Result<BrowseView, PlayerError> {
        let listing = browser::list_directory(&self.current_dir)?;
        let view_playlist = browser::view_playlist(&self.current_dir, &listing);
        let window = browser::page_window(
            listing.audio_files.len(),
            self.store.config.page_size,
            self.store.config.current_page,
        );
        let items = ItemIndex::build(&self.current_dir, &self.root, &listing, window.clone());
        Ok(BrowseView {
            listing,
            view_playlist,
            window,
            items,
        })
    }

    pub fn dispatch(&mut self, command: Command, view: &BrowseView) -> Flow {
        tracing::debug!("dispatching {command:?}");
        match command {
            Command::Select(number) => {
                if let Err(err) = self.select(number, view) {
                    self.report(err);
                }
            }
            Command::Add(number) => self.add_to_queue(number, view),
            Command::Clear => {
                self.queue.clear();
                self.set_status("Queue cleared.");
            }
            Command::VolumeUp => self.step_volume(true),
            Command::VolumeDown => self.step_volume(false),
            Command::TogglePause => {
                let message = match self.playback.toggle_pause() {
                    PauseToggle::Paused => "Paused.",
                    PauseToggle::Resumed => "Resumed.",
                    PauseToggle::Idle => "No song is currently playing.",
                };
                self.set_status(message);
            }
            Command::Next => self.next(),
            Command::Previous => {
                if let Some(path) = self.session.previous().map(Path::to_path_buf) {
                    self.play(&path);
                }
            }
            Command::ShuffleAndPlay => self.shuffle_and_play(view),
            Command::ToggleShuffle => self.toggle_shuffle(view),
            Command::NextPage => {
                let config = &mut self.store.config;
                config.current_page =
                    browser::next_page(config.current_page, config.page_size, view.audio_count());
                self.persist();
            }
            Command::PreviousPage => {
                self.store.config.current_page =
                    browser::previous_page(self.store.config.current_page);
                self.persist();
            }
            Command::Quit => {
                self.shutdown();
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    /// Records a recoverable failure for the next frame.
    pub fn report(&mut self, err: PlayerError) {
        tracing::warn!("{err}");
        self.status = Some(err.to_string());
    }

    pub fn shutdown(&mut self) {
        self.playback.shutdown();
        tracing::info!("playback stopped");
    }

    fn select(&mut self, number: usize, view: &BrowseView) -> Result<(), PlayerError> {
        let entry = view.items.resolve(number).cloned().ok_or_else(|| {
            PlayerError::InvalidInput(String::from("Invalid number. Please try again."))
        })?;

        match entry {
            MenuEntry::Parent => self.change_dir(browser::parent_of(&self.current_dir)),
            MenuEntry::Folder(path) => self.change_dir(path),
            MenuEntry::Track(path) => {
                if !path.is_file() {
                    return Err(PlayerError::InvalidSelection(format!(
                        "{} is no longer available.",
                        playback::display_name(&path)
                    )));
                }
                let shuffle = self.store.config.shuffle_on;
                if let Some(track) = self
                    .session
                    .start_at(&view.view_playlist, &path, shuffle)
                    .map(Path::to_path_buf)
                {
                    self.play(&track);
                }
            }
        }
        Ok(())
    }

    fn change_dir(&mut self, path: PathBuf) {
        tracing::debug!("entering {}", path.display());
        self.current_dir = path;
        self.store.config.current_page = 0;
        self.persist();
    }

    fn add_to_queue(&mut self, number: usize, view: &BrowseView) {
        let Some(MenuEntry::Track(path)) = view.items.resolve(number) else {
            self.report(PlayerError::InvalidSelection(String::from(
                "Invalid selection. Please enter the number of a song to add.",
            )));
            return;
        };

        match self.queue.enqueue(path) {
            Ok(()) => {
                let label = self.describe(path);
                self.set_status(&format!("Added to queue: {label}"));
            }
            Err(err) => self.report(err),
        }
    }

    fn step_volume(&mut self, up: bool) {
        let volume = playback::step_volume(self.store.config.volume, up);
        self.store.config.volume = volume;
        self.playback.set_volume(volume);
        self.set_status(&format!("Volume: {}%", (volume * 100.0).round() as u8));
        self.persist();
    }

    fn next(&mut self) {
        if let Ok(path) = self.queue.dequeue_next() {
            self.session.detach();
            self.play(&path);
        } else if let Some(path) = self.session.next().map(Path::to_path_buf) {
            self.play(&path);
        }
    }

    fn shuffle_and_play(&mut self, view: &BrowseView) {
        if view.view_playlist.is_empty() {
            self.set_status("No songs in this folder to shuffle.");
            return;
        }
        self.store.config.shuffle_on = true;
        self.persist();
        if let Some(path) = self
            .session
            .shuffle_from(&view.view_playlist)
            .map(Path::to_path_buf)
        {
            self.play(&path);
        }
    }

    fn toggle_shuffle(&mut self, view: &BrowseView) {
        let shuffle = !self.store.config.shuffle_on;
        self.store.config.shuffle_on = shuffle;
        self.persist();

        let playlist_track = self
            .session
            .index()
            .and(self.playback.now_playing())
            .map(Path::to_path_buf);
        self.session
            .reorder(&view.view_playlist, shuffle, playlist_track.as_deref());
        if playlist_track.is_some() && self.session.index().is_none() {
            tracing::info!("now playing track is not part of the rebuilt playlist");
        }
        self.set_status(if shuffle { "Shuffle on." } else { "Shuffle off." });
    }

    fn play(&mut self, path: &Path) {
        if let Err(err) = self.playback.play_song(path) {
            self.report(err);
        }
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save() {
            self.report(PlayerError::Persist(format!("{err:#}")));
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = Some(message.to_string());
    }
}
