use super::playlist::{PlayList, PlaylistStore};
use super::scanner::MusicScanner;
use super::tracklist::{PlaylistOrder, Tracklist};
use super::transport::AudioTransport;
use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What the progress display shows for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    pub path: PathBuf,
    pub name: String,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
}

const VOLUME_STEP: f32 = 0.1;

// Exact step; rounding to 1e-3 only absorbs float drift
fn step_volume(volume: f32, delta: f32) -> f32 {
    ((volume + delta) * 1000.0).round() / 1000.0
}

fn format_time(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

impl Progress {
    /// Fraction played, 0.0 when the duration is unknown
    pub fn ratio(&self) -> f64 {
        match self.duration_seconds {
            Some(duration) if duration > 0.0 => (self.position_seconds / duration).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    pub fn label(&self) -> String {
        let duration = self.duration_seconds.map_or_else(|| "--:--".to_string(), format_time);
        format!("{}/{}", format_time(self.position_seconds), duration)
    }
}

/// Binds a tracklist to an audio transport.
///
/// The transport is polled, never trusted to call back: `tick` is expected
/// at a fixed period and is where finished tracks are noticed.
pub struct PlaybackSession<T: AudioTransport> {
    tracklist: Tracklist,
    transport: T,
    state: PlaybackState,
    start_offset_seconds: f64,
    volume: f32,
    muted: bool,
    seek_step_seconds: f64,
    playlist: Option<PlayList>,
}

impl<T: AudioTransport> PlaybackSession<T> {
    pub fn new(tracklist: Tracklist, mut transport: T, config: &PlayerConfig) -> Self {
        let volume = config.volume.clamp(0.0, 1.0);
        transport.set_volume(volume);
        Self {
            tracklist,
            transport,
            state: PlaybackState::Stopped,
            start_offset_seconds: 0.0,
            volume,
            muted: false,
            seek_step_seconds: config.seek_step_seconds,
            playlist: None,
        }
    }

    pub fn tracklist(&self) -> &Tracklist {
        &self.tracklist
    }

    pub fn tracklist_mut(&mut self) -> &mut Tracklist {
        &mut self.tracklist
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// The user's volume, kept while muted
    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn playlist(&self) -> Option<&PlayList> {
        self.playlist.as_ref()
    }

    /// Selections are written through to this playlist from now on
    pub fn bind_playlist(&mut self, playlist: Option<PlayList>) {
        self.playlist = playlist;
    }

    fn start(&mut self, path: &Path) -> Result<()> {
        self.start_offset_seconds = 0.0;
        self.transport.load(path)?;
        self.transport.play(0.0)?;
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn persist_selection(&mut self, path: &Path) {
        if let Some(playlist) = self.playlist.as_mut() {
            if let Err(e) = playlist.select(path) {
                warn!("Could not record selection in playlist '{}': {}", playlist.name, e);
            }
        }
    }

    /// Load and start `path`. Tracks that fail to load are skipped, moving
    /// down the list until one plays or the list runs out.
    pub fn play_song(&mut self, path: &Path) {
        let mut path = path.to_path_buf();
        loop {
            match self.start(&path) {
                Ok(()) => {
                    info!("Playing {}", path.display());
                    self.persist_selection(&path);
                    return;
                }
                Err(e) => {
                    error!("Failed to play {}: {}", path.display(), e);
                    match self.tracklist.next_song() {
                        Some(next) => path = next.path().to_path_buf(),
                        None => {
                            warn!("No playable track left in the list");
                            self.stop();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Commit the cursor track and play it
    pub fn select_cursor(&mut self) {
        if let Some(track) = self.tracklist.select_cursor() {
            self.play_song(track.path());
        }
    }

    pub fn next_song(&mut self) {
        if let Some(track) = self.tracklist.next_song() {
            self.play_song(track.path());
        }
    }

    pub fn previous_song(&mut self) {
        if let Some(track) = self.tracklist.previous_song() {
            self.play_song(track.path());
        }
    }

    pub fn toggle_play_pause(&mut self) {
        if self.transport.is_busy() {
            if self.transport.is_paused() {
                self.transport.unpause();
                self.state = PlaybackState::Playing;
                debug!("Resumed");
            } else {
                self.transport.pause();
                self.state = PlaybackState::Paused;
                debug!("Paused");
            }
            return;
        }

        match self.tracklist.current_path().map(Path::to_path_buf) {
            Some(current) => self.play_song(&current),
            None => self.select_cursor(),
        }
    }

    /// Restart the loaded track `delta` seconds from the current position
    pub fn seek_relative(&mut self, delta: f64) {
        if !self.transport.is_busy() {
            return;
        }
        let elapsed = self.transport.elapsed_ms() as f64 / 1000.0;
        let offset = (self.start_offset_seconds + elapsed + delta).max(0.0);
        self.start_offset_seconds = offset;

        match self.transport.play(offset) {
            Ok(()) => {
                self.state = PlaybackState::Playing;
                debug!("Seeked to {:.1}s", offset);
            }
            Err(e) => {
                error!("Seek failed: {}", e);
                self.advance();
            }
        }
    }

    pub fn seek_forward(&mut self) {
        self.seek_relative(self.seek_step_seconds);
    }

    pub fn seek_backward(&mut self) {
        self.seek_relative(-self.seek_step_seconds);
    }

    /// Back to the start of the loaded track
    pub fn reset(&mut self) {
        if !self.transport.is_busy() {
            return;
        }
        self.start_offset_seconds = 0.0;
        if let Err(e) = self.transport.play(0.0) {
            error!("Restart failed: {}", e);
            self.advance();
        } else {
            self.state = PlaybackState::Playing;
        }
    }

    fn advance(&mut self) {
        // with the playing track deleted, the cursor already sits on its successor
        let next = if self.tracklist.current_path().is_some() {
            self.tracklist.next_song()
        } else {
            self.tracklist.select_cursor()
        };
        match next {
            Some(track) => self.play_song(track.path()),
            None => {
                info!("Reached the end of the tracklist");
                self.stop();
            }
        }
    }

    /// Poll the transport. Returns the progress to display, or `None` when
    /// nothing is playing. A finished track advances to the next one.
    pub fn tick(&mut self) -> Option<Progress> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        if !self.transport.is_busy() {
            self.advance();
            if self.state != PlaybackState::Playing {
                return None;
            }
        }

        let path = self.tracklist.current_path()?.to_path_buf();
        let track = self.tracklist.current_track();
        let position_seconds = self.start_offset_seconds + self.transport.elapsed_ms() as f64 / 1000.0;
        Some(Progress {
            name: track.map_or_else(
                || path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
                |t| t.name(),
            ),
            duration_seconds: track.and_then(|t| t.duration().ok()),
            position_seconds,
            path,
        })
    }

    pub fn stop(&mut self) {
        self.transport.stop();
        self.state = PlaybackState::Stopped;
        self.start_offset_seconds = 0.0;
    }

    fn apply_volume(&mut self) {
        let effective = if self.muted { 0.0 } else { self.volume };
        self.transport.set_volume(effective);
    }

    /// Set the volume (clamped to [0, 1]); unmutes
    pub fn set_volume(&mut self, volume: f32) {
        self.muted = false;
        self.volume = volume.clamp(0.0, 1.0);
        self.apply_volume();
    }

    pub fn increase_volume(&mut self) {
        self.set_volume(step_volume(self.volume, VOLUME_STEP));
    }

    pub fn decrease_volume(&mut self) {
        self.set_volume(step_volume(self.volume, -VOLUME_STEP));
    }

    pub fn mute(&mut self) {
        self.muted = true;
        self.apply_volume();
    }

    pub fn unmute(&mut self) {
        self.muted = false;
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Replace the tracklist with a directory's audio files, sorted by the
    /// current order. The list is no longer tied to a saved playlist.
    pub fn load_directory(&mut self, scanner: &MusicScanner, path: &Path) -> Result<usize> {
        let paths = scanner.scan(path)?;
        let count = paths.len();
        self.tracklist.set_tracks(paths, 0, true);
        self.playlist = None;
        info!("Loaded {} tracks from {}", count, path.display());
        Ok(count)
    }

    /// Append a file or directory's audio files to the end of the list
    pub fn add_songs(&mut self, scanner: &MusicScanner, path: &Path) -> Result<usize> {
        let paths = scanner.scan(path)?;
        if paths.is_empty() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }
        let count = paths.len();
        self.tracklist.add(paths);
        Ok(count)
    }

    /// Show a saved playlist in its stored order and put the cursor on its
    /// selected track. Playback is not started.
    pub fn load_playlist(&mut self, playlist: PlayList) -> Result<()> {
        if !playlist.exists() {
            return Err(PlayerError::NotFound(playlist.path.clone()));
        }

        self.tracklist.set_tracks(playlist.songs.clone(), 0, false);
        if let Some(selected) = playlist.selected.as_deref() {
            if !self.tracklist.select(selected) {
                debug!("Selected track {} is not in the playlist", selected.display());
            }
        }

        info!("Loaded playlist '{}' ({} songs)", playlist.name, playlist.songs.len());
        self.playlist = Some(playlist);
        Ok(())
    }

    /// Snapshot the tracklist under `name` and bind to the saved playlist
    pub fn save_playlist(&mut self, store: &PlaylistStore, name: &str) -> Result<PathBuf> {
        let playlist = store.create(name, &self.tracklist)?;
        let path = playlist.path.clone();
        self.playlist = Some(playlist);
        Ok(path)
    }

    pub fn change_order(&mut self, order: PlaylistOrder) {
        self.tracklist.set_order(order);
        self.tracklist.resort();
        info!("Playlist order set to {}", order.label());
    }
}
