use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};

/// The ordered tracks driving sequential playback and the cursor into them.
#[derive(Debug)]
pub struct PlaylistSession {
    tracks: Vec<PathBuf>,
    index: Option<usize>,
    rng: SmallRng,
}

impl Default for PlaylistSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaylistSession {
    pub fn new() -> Self {
        Self::with_rng(rand::make_rng())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> Self {
        Self {
            tracks: Vec::new(),
            index: None,
            rng,
        }
    }

    pub fn tracks(&self) -> &[PathBuf] {
        &self.tracks
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn current(&self) -> Option<&Path> {
        self.index
            .and_then(|idx| self.tracks.get(idx))
            .map(PathBuf::as_path)
    }

    /// Forgets the playlist position, e.g. while a queued track plays.
    pub fn detach(&mut self) {
        self.index = None;
    }

    /// Starts a session at `selected`, falling back to the first track when it is absent.
    pub fn start_at(&mut self, view: &[PathBuf], selected: &Path, shuffle: bool) -> Option<&Path> {
        self.rebuild(view, shuffle);
        if self.tracks.is_empty() {
            self.index = None;
            return None;
        }
        self.index = Some(
            self.tracks
                .iter()
                .position(|track| track == selected)
                .unwrap_or(0),
        );
        self.current()
    }

    /// Starts a freshly shuffled session at its first track.
    pub fn shuffle_from(&mut self, view: &[PathBuf]) -> Option<&Path> {
        self.rebuild(view, true);
        self.index = (!self.tracks.is_empty()).then_some(0);
        self.current()
    }

    /// Re-orders the session after the shuffle flag changed, following
    /// `now_playing` into the new order when it is still present.
    pub fn reorder(&mut self, view: &[PathBuf], shuffle: bool, now_playing: Option<&Path>) {
        self.rebuild(view, shuffle);
        self.index =
            now_playing.and_then(|playing| self.tracks.iter().position(|track| track == playing));
    }

    /// Manual next. Does nothing without a position.
    pub fn next(&mut self) -> Option<&Path> {
        let current = self.index?;
        if self.tracks.is_empty() {
            return None;
        }
        self.index = Some((current + 1) % self.tracks.len());
        self.current()
    }

    /// Manual previous. Does nothing without a position.
    pub fn previous(&mut self) -> Option<&Path> {
        let current = self.index?;
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }
        self.index = Some((current + len - 1) % len);
        self.current()
    }

    /// Advance after a track finished on its own. Without a position the
    /// session restarts from its first track.
    pub fn advance_after_completion(&mut self) -> Option<&Path> {
        if self.tracks.is_empty() {
            return None;
        }
        let next = self
            .index
            .map_or(0, |current| (current + 1) % self.tracks.len());
        self.index = Some(next);
        self.current()
    }

    fn rebuild(&mut self, view: &[PathBuf], shuffle: bool) {
        self.tracks = view.to_vec();
        if shuffle {
            self.tracks.shuffle(&mut self.rng);
        } else {
            self.tracks.sort();
        }
    }
}
