use crate::error::PlayerError;
use crate::model::MenuEntry;
use std::ffi::OsStr;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "flac", "aiff", "aif", "m4a", "aac"];

/// Immediate children of a directory, split into folders and playable files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryListing {
    pub subfolders: Vec<String>,
    pub audio_files: Vec<String>,
}

pub fn list_directory(dir: &Path) -> Result<DirectoryListing, PlayerError> {
    let read_dir = fs::read_dir(dir).map_err(|source| PlayerError::DirectoryUnavailable {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut listing = DirectoryListing::default();
    for entry in read_dir.filter_map(Result::ok) {
        let name = entry.file_name().to_string_lossy().to_string();
        let path = entry.path();
        if path.is_dir() {
            listing.subfolders.push(name);
        } else if path.is_file() && is_audio_file(&path) {
            listing.audio_files.push(name);
        }
    }

    listing.subfolders.sort();
    listing.audio_files.sort();
    Ok(listing)
}

pub fn is_audio_file(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    AUDIO_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
}

pub fn parent_of(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}

/// Absolute paths of every audio file in `dir`, in listing order.
pub fn view_playlist(dir: &Path, listing: &DirectoryListing) -> Vec<PathBuf> {
    listing
        .audio_files
        .iter()
        .map(|name| dir.join(name))
        .collect()
}

/// Slice of the audio listing shown on `page`; empty when the page is past the end.
pub fn page_window(total: usize, page_size: usize, page: usize) -> Range<usize> {
    let start = page.saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    start..end
}

/// Moves one page forward while files remain past the window, otherwise wraps to 0.
pub fn next_page(page: usize, page_size: usize, total: usize) -> usize {
    let window_end = page.saturating_mul(page_size).saturating_add(page_size);
    if window_end < total { page + 1 } else { 0 }
}

pub fn previous_page(page: usize) -> usize {
    page.saturating_sub(1)
}

pub fn needs_pagination(total: usize, page_size: usize) -> bool {
    total > page_size
}

/// Display numbers for the current frame. Numbering starts at 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemIndex {
    entries: Vec<MenuEntry>,
}

impl ItemIndex {
    pub fn build(
        current: &Path,
        root: &Path,
        listing: &DirectoryListing,
        window: Range<usize>,
    ) -> Self {
        let mut entries = Vec::new();
        if current != root {
            entries.push(MenuEntry::Parent);
        }
        entries.extend(
            listing
                .subfolders
                .iter()
                .map(|name| MenuEntry::Folder(current.join(name))),
        );
        if let Some(page) = listing.audio_files.get(window) {
            entries.extend(page.iter().map(|name| MenuEntry::Track(current.join(name))));
        }
        Self { entries }
    }

    pub fn resolve(&self, number: usize) -> Option<&MenuEntry> {
        number.checked_sub(1).and_then(|idx| self.entries.get(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &MenuEntry)> {
        self.entries.iter().enumerate().map(|(idx, entry)| (idx + 1, entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
