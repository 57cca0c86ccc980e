use crate::error::PlayerError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

/// Tracks the user asked to hear next, played ahead of the playlist.
#[derive(Debug, Clone, Default)]
pub struct TrackQueue {
    tracks: VecDeque<PathBuf>,
}

impl TrackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, path: &Path) -> Result<(), PlayerError> {
        if !path.is_file() {
            return Err(PlayerError::InvalidSelection(String::from(
                "Invalid selection. Please enter the number of a song to add.",
            )));
        }
        self.tracks.push_back(path.to_path_buf());
        Ok(())
    }

    pub fn dequeue_next(&mut self) -> Result<PathBuf, PlayerError> {
        self.tracks.pop_front().ok_or(PlayerError::QueueEmpty)
    }

    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.tracks.iter().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
