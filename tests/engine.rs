use cplayer::audio::{AudioTransport, MusicScanner, PlaybackSession, PlaybackState, PlayList, PlaylistStore};
use cplayer::config::PlayerConfig;
use cplayer::{PlayerError, PlaylistOrder, Result, Tracklist};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Plays nothing; a track "ends" when the test says so
#[derive(Default)]
struct SilentTransport {
    loaded: Vec<PathBuf>,
    busy: bool,
    paused: bool,
    elapsed_ms: u64,
    volume: f32,
}

impl AudioTransport for SilentTransport {
    fn load(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PlayerError::media(path, "no such file"));
        }
        self.loaded.push(path.to_path_buf());
        Ok(())
    }

    fn play(&mut self, _start_at_seconds: f64) -> Result<()> {
        self.busy = true;
        self.paused = false;
        self.elapsed_ms = 0;
        Ok(())
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn unpause(&mut self) {
        self.paused = false;
    }

    fn stop(&mut self) {
        self.busy = false;
    }

    fn is_busy(&self) -> bool {
        self.busy
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }
}

/// 16-bit mono PCM of constant amplitude
fn write_wav(path: &Path, sample_rate: u32, seconds: u32) {
    let samples = sample_rate * seconds;
    let data_len = samples * 2;
    let mut bytes = Vec::with_capacity(44 + data_len as usize);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVEfmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let value: i16 = if i % 2 == 0 { 8000 } else { -8000 };
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(path, bytes).unwrap();
}

fn session() -> PlaybackSession<SilentTransport> {
    PlaybackSession::new(
        Tracklist::with_seed(PlaylistOrder::Ascending, 1),
        SilentTransport::default(),
        &PlayerConfig::default(),
    )
}

#[test]
fn directory_to_playlist_and_back() {
    let library = tempdir().unwrap();
    write_wav(&library.path().join("02 second.wav"), 8000, 1);
    write_wav(&library.path().join("01 first.wav"), 8000, 2);
    write_wav(&library.path().join(".hidden.wav"), 8000, 1);
    fs::write(library.path().join("cover.jpg"), b"not audio").unwrap();

    let scanner = MusicScanner::default();
    let mut player = session();
    assert_eq!(player.load_directory(&scanner, library.path()).unwrap(), 2);

    // first track plays, then the second once the transport goes idle
    player.select_cursor();
    let progress = player.tick().unwrap();
    assert_eq!(progress.name, "01 first.wav");
    assert!((progress.duration_seconds.unwrap() - 2.0).abs() < 0.01);

    player.transport_mut().busy = false;
    let progress = player.tick().unwrap();
    assert_eq!(progress.name, "02 second.wav");
    assert_eq!(player.transport().loaded.len(), 2);

    // end of the list: playback stops
    player.transport_mut().busy = false;
    assert!(player.tick().is_none());
    assert_eq!(player.state(), PlaybackState::Stopped);

    let lists = tempdir().unwrap();
    let store = PlaylistStore::new(lists.path()).unwrap();
    let saved = player.save_playlist(&store, "evening").unwrap();
    assert_eq!(store.list().unwrap(), vec![saved.clone()]);

    let mut restored = session();
    restored.load_playlist(PlayList::load(&saved).unwrap()).unwrap();
    let names: Vec<String> = restored.tracklist().items().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["01 first.wav", "02 second.wav"]);
    assert_eq!(restored.tracklist().cursor(), Some(1));
}

#[test]
fn missing_files_are_skipped_during_playback() {
    let library = tempdir().unwrap();
    let kept = library.path().join("kept.wav");
    write_wav(&kept, 8000, 1);

    let mut player = session();
    player.tracklist_mut().set_tracks(vec![library.path().join("gone.wav"), kept.clone()], 0, false);
    player.select_cursor();

    assert_eq!(player.transport().loaded, vec![kept]);
    assert_eq!(player.state(), PlaybackState::Playing);
}

#[test]
fn filter_search_and_reorder_keep_the_full_list() {
    let mut list = Tracklist::new(PlaylistOrder::Ascending);
    let paths: Vec<PathBuf> = ["alpha.mp3", "bravo.mp3", "charlie.mp3", "delta.mp3"]
        .iter()
        .map(PathBuf::from)
        .collect();
    list.set_tracks(paths, 0, true);

    list.filter("l");
    assert_eq!(list.len(), 3);
    list.search("chrlie");
    assert_eq!(list.cursor_track().unwrap().name(), "charlie.mp3");
    list.swap(0);

    list.filter("");
    let names: Vec<String> = list.items().iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["charlie.mp3", "bravo.mp3", "alpha.mp3", "delta.mp3"]);
}
