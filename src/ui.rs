use crate::audio::AudioEngine;
use crate::core::{BrowseView, Player};
use crate::metadata;
use crate::model::{MenuEntry, PlaybackState};
use crate::playback::display_name;
use anyhow::Result;
use crossterm::cursor::MoveTo;
use crossterm::style::{PrintStyledContent, Stylize};
use crossterm::terminal::{self, Clear, ClearType, SetTitle};
use crossterm::{execute, queue};
use std::io::Write;
use std::path::{Path, PathBuf};

const INDENT: usize = 2;
const COLUMN_PAD: usize = 3;
const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameItem {
    pub number: usize,
    pub marker: &'static str,
    pub label: String,
}

impl FrameItem {
    fn plain_len(&self) -> usize {
        format!("{}. {} {}", self.number, self.marker, self.label)
            .chars()
            .count()
    }
}

/// Display data for one render cycle. Built fresh every iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub current_dir: PathBuf,
    pub shuffle_on: bool,
    pub items: Vec<FrameItem>,
    pub show_pagination: bool,
    pub now_playing: Option<String>,
    pub volume_percent: u8,
    pub queue: Vec<String>,
    pub album_art: Option<String>,
    pub status: Option<String>,
}

pub fn build_frame<E: AudioEngine>(
    player: &Player<E>,
    view: &BrowseView,
    status: Option<String>,
) -> Frame {
    let items = view
        .items
        .iter()
        .map(|(number, entry)| FrameItem {
            number,
            marker: entry.marker(),
            label: match entry {
                MenuEntry::Parent => String::from(".."),
                MenuEntry::Folder(path) => display_name(path),
                MenuEntry::Track(path) => player.describe(path),
            },
        })
        .collect();

    let playback = player.playback();
    let now_playing = match playback.state() {
        PlaybackState::Playing | PlaybackState::Paused => {
            playback.now_playing().map(|path| player.describe(path))
        }
        PlaybackState::Stopped => None,
    };

    Frame {
        current_dir: player.current_dir().to_path_buf(),
        shuffle_on: player.config().shuffle_on,
        items,
        show_pagination: crate::browser::needs_pagination(
            view.audio_count(),
            player.config().page_size,
        ),
        now_playing,
        volume_percent: (player.config().volume * 100.0).round() as u8,
        queue: player.queue().iter().map(|path| player.describe(path)).collect(),
        album_art: metadata::find_album_art(player.current_dir()).map(|path| display_name(&path)),
        status,
    }
}

/// Column-major placement of items across the terminal width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub column_width: usize,
    pub rows: Vec<Vec<usize>>,
}

pub fn column_layout(lengths: &[usize], width: usize, indent: usize, pad: usize) -> ColumnLayout {
    let Some(longest) = lengths.iter().copied().max() else {
        return ColumnLayout {
            column_width: 0,
            rows: Vec::new(),
        };
    };

    let column_width = longest + pad;
    let columns = (width.saturating_sub(indent) / column_width).max(1);
    let row_count = lengths.len().div_ceil(columns);
    let rows = (0..row_count)
        .map(|row| {
            (0..columns)
                .map(|col| col * row_count + row)
                .filter(|idx| *idx < lengths.len())
                .collect()
        })
        .collect();

    ColumnLayout { column_width, rows }
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame) -> Result<()>;
    fn welcome(&mut self, last_folder: &Path) -> Result<()>;
    fn prompt(&mut self, text: &str) -> Result<()>;
    fn notice(&mut self, text: &str) -> Result<()>;
}

/// Full-screen redraw on a plain terminal using crossterm styling.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(mut out: W) -> Result<Self> {
        execute!(out, SetTitle("dirplay"))?;
        Ok(Self { out })
    }

    fn terminal_width() -> usize {
        terminal::size()
            .map(|(cols, _)| usize::from(cols))
            .unwrap_or(FALLBACK_WIDTH)
    }

    fn draw_items(&mut self, items: &[FrameItem]) -> Result<()> {
        let lengths: Vec<usize> = items.iter().map(FrameItem::plain_len).collect();
        let layout = column_layout(&lengths, Self::terminal_width(), INDENT, COLUMN_PAD);

        for row in &layout.rows {
            write!(self.out, "{}", " ".repeat(INDENT))?;
            for idx in row {
                let item = &items[*idx];
                let marker = if item.marker == "DIR" {
                    item.marker.blue()
                } else {
                    item.marker.green()
                };
                queue!(
                    self.out,
                    PrintStyledContent(format!("{}.", item.number).yellow().bold()),
                )?;
                write!(self.out, " ")?;
                queue!(self.out, PrintStyledContent(marker))?;
                let padding = layout.column_width.saturating_sub(lengths[*idx]);
                write!(self.out, " {}{}", item.label, " ".repeat(padding))?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render(&mut self, frame: &Frame) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        writeln!(self.out)?;
        queue!(
            self.out,
            PrintStyledContent("dir".red()),
            PrintStyledContent("PLAY".white().bold()),
        )?;
        writeln!(self.out, "\n")?;
        queue!(self.out, PrintStyledContent("Current Directory:".green().bold()))?;
        writeln!(self.out, " {}", frame.current_dir.display())?;
        queue!(self.out, PrintStyledContent("Shuffle Mode:".magenta().bold()))?;
        writeln!(self.out, " {}", if frame.shuffle_on { "On" } else { "Off" })?;
        if let Some(art) = &frame.album_art {
            queue!(self.out, PrintStyledContent("Album Art:".cyan().bold()))?;
            writeln!(self.out, " {art}")?;
        }
        writeln!(self.out, "{}", "-".repeat(50))?;

        self.draw_items(&frame.items)?;

        if frame.show_pagination {
            writeln!(self.out)?;
            queue!(
                self.out,
                PrintStyledContent("Pagination:".bold()),
                PrintStyledContent(" n".blue().bold()),
            )?;
            writeln!(self.out, " (next page) | p (previous page)")?;
        }
        writeln!(self.out)?;

        match &frame.now_playing {
            Some(label) => {
                queue!(self.out, PrintStyledContent("Now Playing:".green().bold()))?;
                write!(self.out, " {label} | ")?;
                queue!(self.out, PrintStyledContent("Volume:".blue().bold()))?;
                writeln!(self.out, " {}%", frame.volume_percent)?;
            }
            None => {
                queue!(self.out, PrintStyledContent("No song is currently playing.".dim()))?;
                writeln!(self.out)?;
            }
        }

        if !frame.queue.is_empty() {
            queue!(self.out, PrintStyledContent("Current Queue:".cyan().bold()))?;
            writeln!(self.out)?;
            for label in &frame.queue {
                writeln!(self.out, "  - {label}")?;
            }
        }

        writeln!(self.out)?;
        queue!(self.out, PrintStyledContent("Queue Commands:".yellow().bold()))?;
        writeln!(self.out, " add (add to queue) | clear (clear queue)")?;
        queue!(self.out, PrintStyledContent("Playback Controls:".yellow().bold()))?;
        writeln!(
            self.out,
            " > (next) | < (previous) | + (vol up) | - (vol down) | t (toggle shuffle) | s (shuffle & play) | pause (pause/unpause) | q (quit)"
        )?;

        if let Some(status) = &frame.status {
            writeln!(self.out)?;
            queue!(self.out, PrintStyledContent(status.as_str().bold()))?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn welcome(&mut self, last_folder: &Path) -> Result<()> {
        writeln!(self.out, "{}", "=".repeat(50))?;
        queue!(self.out, PrintStyledContent("Welcome to dirplay!".blue().bold()))?;
        writeln!(self.out, "\n")?;
        writeln!(self.out, "Press Enter to use the last path: {}", last_folder.display())?;
        writeln!(self.out, "or type a new path and press Enter.")?;
        writeln!(self.out, "{}", "=".repeat(50))?;
        self.out.flush()?;
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        Ok(())
    }

    fn notice(&mut self, text: &str) -> Result<()> {
        queue!(self.out, PrintStyledContent(text.red().bold()))?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
