use crate::audio::{AudioEngine, NullAudioEngine, RodioAudioEngine};
use crate::config::ConfigStore;
use crate::core::{Flow, Input, Player, parse_add_number, parse_input};
use crate::metadata::TagDescriber;
use crate::ui::{Renderer, TerminalRenderer, build_frame};
use anyhow::{Context, Result};
use std::io::{self, BufRead};
use std::path::PathBuf;

#[derive(Debug, Clone, Default)]
pub struct AppStartupOptions {
    pub config_path: PathBuf,
    pub folder: Option<PathBuf>,
}

/// Why a browsing session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    DirectoryLost,
    InputClosed,
}

pub fn run_with_startup(options: AppStartupOptions) -> Result<()> {
    let store = ConfigStore::open(options.config_path);
    tracing::info!("configuration at {}", store.path().display());

    let engine: Box<dyn AudioEngine> = match RodioAudioEngine::new() {
        Ok(engine) => Box::new(engine),
        Err(err) => {
            tracing::warn!("audio output unavailable, continuing silently: {err:#}");
            Box::new(NullAudioEngine::new())
        }
    };

    let mut player = Player::new(store, engine, Box::new(TagDescriber));
    let mut renderer = TerminalRenderer::new(io::stdout())?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    run_player(&mut player, &mut input, &mut renderer, options.folder)?;
    player.shutdown();
    Ok(())
}

/// Top-level prompt: choose a folder, browse it, and come back here when the
/// folder disappears or is invalid.
pub fn run_player<E: AudioEngine>(
    player: &mut Player<E>,
    input: &mut impl BufRead,
    renderer: &mut impl Renderer,
    mut folder: Option<PathBuf>,
) -> Result<SessionEnd> {
    loop {
        let chosen = match folder.take() {
            Some(path) => path,
            None => {
                renderer.welcome(&player.config().music_folder)?;
                renderer.prompt("Music folder path: ")?;
                let Some(line) = read_line(input)? else {
                    return Ok(SessionEnd::InputClosed);
                };
                let typed = line.trim();
                if typed.is_empty() {
                    player.config().music_folder.clone()
                } else {
                    PathBuf::from(typed)
                }
            }
        };

        if let Err(err) = player.open_folder(&chosen) {
            tracing::warn!("{err}");
            renderer.notice(&format!("Error: {err}"))?;
            continue;
        }

        match run_session(player, input, renderer)? {
            SessionEnd::DirectoryLost => continue,
            end => return Ok(end),
        }
    }
}

/// The browse/playback loop: poll completion, render, read one line, dispatch.
pub fn run_session<E: AudioEngine>(
    player: &mut Player<E>,
    input: &mut impl BufRead,
    renderer: &mut impl Renderer,
) -> Result<SessionEnd> {
    loop {
        player.poll_completion();

        let view = match player.refresh() {
            Ok(view) => view,
            Err(err) if !err.is_recoverable() => {
                tracing::error!("{err}");
                renderer.notice(&format!("Error: {err}. Returning to the main prompt."))?;
                return Ok(SessionEnd::DirectoryLost);
            }
            Err(err) => return Err(err).context("failed to list the current folder"),
        };

        let status = player.take_status();
        renderer.render(&build_frame(player, &view, status))?;
        renderer.prompt("Enter a number to select, or a command: ")?;

        let Some(line) = read_line(input)? else {
            player.shutdown();
            return Ok(SessionEnd::InputClosed);
        };

        let command = match parse_input(&line) {
            Ok(Input::Command(command)) => command,
            Ok(Input::AddPrompt) => {
                renderer.prompt("Enter number of song to add to queue: ")?;
                let Some(answer) = read_line(input)? else {
                    player.shutdown();
                    return Ok(SessionEnd::InputClosed);
                };
                match parse_add_number(&answer) {
                    Ok(command) => command,
                    Err(err) => {
                        player.report(err);
                        continue;
                    }
                }
            }
            Err(err) => {
                player.report(err);
                continue;
            }
        };

        if player.dispatch(command, &view) == Flow::Quit {
            renderer.notice("Exiting dirplay. Come back soon!")?;
            return Ok(SessionEnd::Quit);
        }
    }
}

fn read_line(input: &mut impl BufRead) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read from stdin")?;
    Ok((read > 0).then_some(line))
}
