use anyhow::{Context, Result};
use rodio::Source;
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::{
    Decoder, DeviceSinkBuilder as OutputStreamBuilder, MixerDeviceSink as OutputStream,
    Player as Sink,
};
#[cfg(unix)]
use std::ffi::CString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// The narrow surface the player needs from an audio backend.
///
/// `take_finished` is the completion signal: it reports `true` exactly once
/// after a loaded track plays to its natural end, and never after `stop`.
pub trait AudioEngine {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn is_busy(&self) -> bool;
    fn take_finished(&mut self) -> bool;
}

impl<E: AudioEngine + ?Sized> AudioEngine for Box<E> {
    fn load(&mut self, path: &Path) -> Result<()> {
        (**self).load(path)
    }

    fn play(&mut self) {
        (**self).play();
    }

    fn pause(&mut self) {
        (**self).pause();
    }

    fn resume(&mut self) {
        (**self).resume();
    }

    fn stop(&mut self) {
        (**self).stop();
    }

    fn set_volume(&mut self, volume: f32) {
        (**self).set_volume(volume);
    }

    fn is_busy(&self) -> bool {
        (**self).is_busy()
    }

    fn take_finished(&mut self) -> bool {
        (**self).take_finished()
    }
}

/// Plays through the system output device. Each load gets a fresh sink so a
/// failed decode leaves the previous track untouched.
pub struct RodioAudioEngine {
    stream: OutputStream,
    sink: Sink,
    loaded: Option<PathBuf>,
    volume: f32,
    reported_end: bool,
}

impl RodioAudioEngine {
    pub fn new() -> Result<Self> {
        let mut stream = with_silenced_stderr(open_output)?;
        stream.log_on_drop(false);
        let sink = Sink::connect_new(stream.mixer());
        Ok(Self {
            stream,
            sink,
            loaded: None,
            volume: 1.0,
            reported_end: false,
        })
    }

    fn drained(&self) -> bool {
        self.loaded.is_some() && !self.sink.is_paused() && self.sink.empty()
    }
}

fn start_stream(builder: OutputStreamBuilder) -> Result<OutputStream> {
    builder
        .with_error_callback(|_| {})
        .open_sink_or_fallback()
        .context("output stream refused to start")
}

fn open_output() -> Result<OutputStream> {
    let default_err = match OutputStreamBuilder::from_default_device()
        .context("no default output device")
        .and_then(start_stream)
    {
        Ok(stream) => return Ok(stream),
        Err(err) => err,
    };
    tracing::warn!("default output failed, probing other devices: {default_err:#}");

    let host = rodio::cpal::default_host();
    let devices = host.output_devices().ok().into_iter().flatten();
    for device in devices {
        let name = device.name().unwrap_or_default();
        match OutputStreamBuilder::from_device(device)
            .context("device rejected")
            .and_then(start_stream)
        {
            Ok(stream) => {
                tracing::info!("audio output on {name}");
                return Ok(stream);
            }
            Err(err) => tracing::debug!("skipping output device {name}: {err:#}"),
        }
    }
    Err(default_err.context("no usable audio output device"))
}

impl AudioEngine for RodioAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let decoded =
            Decoder::try_from(file).with_context(|| format!("cannot decode {}", path.display()))?;

        let next = Sink::connect_new(self.stream.mixer());
        next.pause();
        next.set_volume(self.volume);
        next.append(decoded);

        std::mem::replace(&mut self.sink, next).stop();
        self.loaded = Some(path.to_path_buf());
        self.reported_end = false;
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.sink.play();
        }
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn resume(&mut self) {
        self.play();
    }

    fn stop(&mut self) {
        self.sink.stop();
        self.loaded = None;
        self.reported_end = false;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.sink.set_volume(self.volume);
    }

    fn is_busy(&self) -> bool {
        self.loaded.is_some() && !self.sink.is_paused() && !self.sink.empty()
    }

    fn take_finished(&mut self) -> bool {
        if self.reported_end || !self.drained() {
            return false;
        }
        self.reported_end = true;
        true
    }
}

// ALSA and JACK print probe noise straight to stderr while devices are opened.
#[cfg(unix)]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    let _restore = StderrRedirect::to_devnull();
    operation()
}

#[cfg(not(unix))]
fn with_silenced_stderr<T>(operation: impl FnOnce() -> T) -> T {
    operation()
}

/// Points fd 2 at /dev/null until dropped.
#[cfg(unix)]
struct StderrRedirect {
    saved: libc::c_int,
}

#[cfg(unix)]
impl StderrRedirect {
    fn to_devnull() -> Option<Self> {
        let devnull = CString::new("/dev/null").ok()?;
        // SAFETY: plain descriptor calls; every fd opened here is closed or handed to Drop.
        unsafe {
            let saved = libc::dup(libc::STDERR_FILENO);
            if saved < 0 {
                return None;
            }
            let sink = libc::open(devnull.as_ptr(), libc::O_WRONLY);
            if sink >= 0 {
                libc::dup2(sink, libc::STDERR_FILENO);
                libc::close(sink);
            }
            Some(Self { saved })
        }
    }
}

#[cfg(unix)]
impl Drop for StderrRedirect {
    fn drop(&mut self) {
        // SAFETY: `saved` is a descriptor duplicated in `to_devnull` and owned here.
        unsafe {
            libc::dup2(self.saved, libc::STDERR_FILENO);
            libc::close(self.saved);
        }
    }
}

/// Where the simulated playhead is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    Idle,
    Running { since: Instant, offset: Duration },
    Held(Duration),
    Ended,
}

/// Silent stand-in used when no output device can be opened. Tracks advance
/// on the wall clock against their decoded length. Files that fail to decode
/// are rejected at load; a track whose length is unknown plays until stopped.
pub struct NullAudioEngine {
    loaded: Option<PathBuf>,
    length: Option<Duration>,
    clock: Clock,
    volume: f32,
}

impl NullAudioEngine {
    pub fn new() -> Self {
        Self {
            loaded: None,
            length: None,
            clock: Clock::Idle,
            volume: 1.0,
        }
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Simulated playhead of the loaded track.
    pub fn position(&self) -> Option<Duration> {
        self.loaded.as_ref()?;
        let elapsed = match self.clock {
            Clock::Idle => Duration::ZERO,
            Clock::Running { since, offset } => offset.saturating_add(since.elapsed()),
            Clock::Held(at) => at,
            Clock::Ended => self.length.unwrap_or_default(),
        };
        Some(self.length.map_or(elapsed, |length| elapsed.min(length)))
    }

    fn past_end(&self) -> bool {
        matches!(self.clock, Clock::Running { .. })
            && self
                .length
                .zip(self.position())
                .is_some_and(|(length, at)| at >= length)
    }
}

/// Decodes `path` to learn its length. `Ok(None)` means the format does not
/// report one.
fn decoded_length(path: &Path) -> Result<Option<Duration>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let decoder =
        Decoder::try_from(file).with_context(|| format!("cannot decode {}", path.display()))?;
    Ok(decoder.total_duration().filter(|length| !length.is_zero()))
}

impl Default for NullAudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine for NullAudioEngine {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.length = decoded_length(path)?;
        self.loaded = Some(path.to_path_buf());
        self.clock = Clock::Idle;
        Ok(())
    }

    fn play(&mut self) {
        if self.loaded.is_some() {
            self.clock = Clock::Running {
                since: Instant::now(),
                offset: Duration::ZERO,
            };
        }
    }

    fn pause(&mut self) {
        if matches!(self.clock, Clock::Running { .. }) {
            self.clock = Clock::Held(self.position().unwrap_or_default());
        }
    }

    fn resume(&mut self) {
        if let Clock::Held(at) = self.clock {
            self.clock = Clock::Running {
                since: Instant::now(),
                offset: at,
            };
        }
    }

    fn stop(&mut self) {
        self.loaded = None;
        self.length = None;
        self.clock = Clock::Idle;
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn is_busy(&self) -> bool {
        matches!(self.clock, Clock::Running { .. }) && !self.past_end()
    }

    fn take_finished(&mut self) -> bool {
        if !self.past_end() {
            return false;
        }
        self.clock = Clock::Ended;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::{AudioEngine, NullAudioEngine};
    use std::path::Path;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Writes a silent 8 kHz mono PCM file of the given length.
    fn silent_wav(path: &Path, millis: u32) {
        let rate: u32 = 8_000;
        let samples = rate * millis / 1_000;
        let data_len = samples * 2;
        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&(36 + data_len).to_le_bytes());
        wav.extend_from_slice(b"WAVEfmt ");
        wav.extend_from_slice(&16_u32.to_le_bytes());
        wav.extend_from_slice(&1_u16.to_le_bytes()); // PCM
        wav.extend_from_slice(&1_u16.to_le_bytes()); // mono
        wav.extend_from_slice(&rate.to_le_bytes());
        wav.extend_from_slice(&(rate * 2).to_le_bytes());
        wav.extend_from_slice(&2_u16.to_le_bytes());
        wav.extend_from_slice(&16_u16.to_le_bytes());
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&data_len.to_le_bytes());
        wav.resize(wav.len() + data_len as usize, 0);
        std::fs::write(path, wav).expect("write wav");
    }

    fn long_track(dir: &Path) -> std::path::PathBuf {
        let track = dir.join("long.wav");
        silent_wav(&track, 2_000);
        track
    }

    #[test]
    fn loaded_track_waits_for_play() {
        let dir = tempdir().expect("tempdir");
        let mut engine = NullAudioEngine::new();
        engine.load(&long_track(dir.path())).expect("load wav");
        assert!(!engine.is_busy());
        assert_eq!(engine.position(), Some(Duration::ZERO));

        engine.play();
        assert!(engine.is_busy());
    }

    #[test]
    fn unreadable_files_fail_to_load() {
        let dir = tempdir().expect("tempdir");
        let mut engine = NullAudioEngine::new();
        assert!(engine.load(&dir.path().join("missing.flac")).is_err());

        let fake = dir.path().join("notes.mp3");
        std::fs::write(&fake, b"not audio at all").expect("write");
        assert!(engine.load(&fake).is_err());
        assert_eq!(engine.position(), None);
        assert!(!engine.is_busy());
    }

    #[test]
    fn failed_load_keeps_the_current_track() {
        let dir = tempdir().expect("tempdir");
        let track = long_track(dir.path());
        let mut engine = NullAudioEngine::new();
        engine.load(&track).expect("load wav");
        engine.play();

        assert!(engine.load(&dir.path().join("missing.flac")).is_err());
        assert!(engine.is_busy());
    }

    #[test]
    fn pause_holds_the_playhead() {
        let dir = tempdir().expect("tempdir");
        let mut engine = NullAudioEngine::new();
        engine.load(&long_track(dir.path())).expect("load wav");
        engine.play();
        thread::sleep(Duration::from_millis(15));

        engine.pause();
        assert!(!engine.is_busy());
        let held = engine.position().expect("position");
        thread::sleep(Duration::from_millis(15));
        assert_eq!(engine.position(), Some(held));

        engine.resume();
        thread::sleep(Duration::from_millis(15));
        assert!(engine.position().expect("position") > held);
    }

    #[test]
    fn known_length_track_finishes_once() {
        let dir = tempdir().expect("tempdir");
        let track = dir.path().join("short.wav");
        silent_wav(&track, 60);

        let mut engine = NullAudioEngine::new();
        engine.load(&track).expect("load wav");
        engine.play();
        thread::sleep(Duration::from_millis(120));

        assert!(!engine.is_busy());
        assert!(engine.take_finished());
        assert!(!engine.take_finished());
    }

    #[test]
    fn stopped_track_never_finishes() {
        let dir = tempdir().expect("tempdir");
        let track = dir.path().join("short.wav");
        silent_wav(&track, 10);

        let mut engine = NullAudioEngine::new();
        engine.load(&track).expect("load wav");
        engine.play();
        engine.stop();
        thread::sleep(Duration::from_millis(30));

        assert!(!engine.take_finished());
        assert_eq!(engine.position(), None);
    }

    #[test]
    fn track_keeps_playing_until_its_length_elapses() {
        let dir = tempdir().expect("tempdir");
        let mut engine = NullAudioEngine::new();
        engine.load(&long_track(dir.path())).expect("load wav");
        engine.play();
        thread::sleep(Duration::from_millis(30));
        assert!(!engine.take_finished());
        assert!(engine.is_busy());
    }

    #[test]
    fn volume_is_clamped() {
        let mut engine = NullAudioEngine::new();
        engine.set_volume(1.7);
        assert_eq!(engine.volume(), 1.0);
        engine.set_volume(-0.2);
        assert_eq!(engine.volume(), 0.0);
    }
}
