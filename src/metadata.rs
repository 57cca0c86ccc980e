use crate::playback::display_name;
use lofty::prelude::{Accessor, TaggedFileExt};
use lofty::probe::Probe;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

const ART_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff"];
const ART_NAMES: &[&str] = &["folder", "cover", "front"];

/// Turns a track path into the label shown to the user.
pub trait TrackDescriber {
    fn describe(&self, path: &Path) -> String;
}

/// Reads title and artist from embedded tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagDescriber;

impl TrackDescriber for TagDescriber {
    fn describe(&self, path: &Path) -> String {
        match read_tags(path) {
            Some((title, artist)) => format!(
                "{} - {}",
                title.unwrap_or_else(|| display_name(path)),
                artist.unwrap_or_else(|| String::from("Unknown Artist"))
            ),
            None => display_name(path),
        }
    }
}

/// Labels tracks by file name only.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileNameDescriber;

impl TrackDescriber for FileNameDescriber {
    fn describe(&self, path: &Path) -> String {
        display_name(path)
    }
}

fn read_tags(path: &Path) -> Option<(Option<String>, Option<String>)> {
    let tagged = Probe::open(path).ok()?.read().ok()?;
    let tag = tagged.primary_tag().or_else(|| tagged.first_tag())?;
    let title = tag.title().and_then(|value| clean_tag_value(&value));
    let artist = tag.artist().and_then(|value| clean_tag_value(&value));
    (title.is_some() || artist.is_some()).then_some((title, artist))
}

fn clean_tag_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// First image in `dir` named like album art (`folder`, `cover`, `front`).
pub fn find_album_art(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_album_art(path))
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}

fn is_album_art(path: &Path) -> bool {
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or_default();
    if !ART_EXTENSIONS
        .iter()
        .any(|supported| ext.eq_ignore_ascii_case(supported))
    {
        return false;
    }
    let stem = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_ascii_lowercase();
    ART_NAMES.iter().any(|name| stem.contains(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn untagged_files_fall_back_to_file_name() {
        let dir = tempdir().expect("tempdir");
        let track = dir.path().join("01 Intro.mp3");
        fs::write(&track, b"not really audio").expect("write");

        assert_eq!(TagDescriber.describe(&track), "01 Intro.mp3");
        assert_eq!(TagDescriber.describe(&dir.path().join("gone.mp3")), "gone.mp3");
        assert_eq!(FileNameDescriber.describe(&track), "01 Intro.mp3");
    }

    #[test]
    fn tag_values_are_trimmed() {
        assert_eq!(clean_tag_value("  Song  "), Some(String::from("Song")));
        assert_eq!(clean_tag_value(" \t "), None);
    }

    #[test]
    fn album_art_matches_known_names() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("notes.png"), b"x").expect("write");
        fs::write(dir.path().join("Cover.JPG"), b"x").expect("write");
        fs::write(dir.path().join("folder.txt"), b"x").expect("write");

        let art = find_album_art(dir.path()).expect("art found");
        assert!(art.ends_with("Cover.JPG"));
    }

    #[test]
    fn album_art_absent() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("track.mp3"), b"x").expect("write");
        assert_eq!(find_album_art(dir.path()), None);
        assert_eq!(find_album_art(&dir.path().join("missing")), None);
    }
}
