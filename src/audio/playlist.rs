use std::fs;
use std::path::{self, Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::tracklist::Tracklist;
use crate::error::{PlayerError, Result};

const PLAYLIST_EXTENSION: &str = "playlist";

fn make_absolute(path: &Path) -> PathBuf {
    path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A named, saved track order with the last selected track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayList {
    pub name: String,
    pub path: PathBuf,
    pub selected: Option<PathBuf>,
    pub songs: Vec<PathBuf>,
    /// Kept as found in the file; nothing here reads or changes it
    pub deleted_songs: Vec<PathBuf>,
}

impl PlayList {
    /// Read the playlist at `path`. A missing file gives an empty, unsaved
    /// playlist bound to that path.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut playlist = if path.exists() {
            let content = fs::read_to_string(path)?;
            let playlist: PlayList = serde_json::from_str(&content)?;
            debug!("Read playlist {} ({} songs)", path.display(), playlist.songs.len());
            playlist
        } else {
            PlayList::default()
        };

        playlist.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        playlist.path = path.to_path_buf();
        Ok(playlist)
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write to the bound path, overwriting, with every path made absolute
    pub fn save(&mut self) -> Result<()> {
        self.path = make_absolute(&self.path);
        self.selected = self.selected.as_deref().map(make_absolute);
        self.songs = self.songs.iter().map(|p| make_absolute(p)).collect();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&self.path, json)?;

        info!("Saved playlist '{}' to {}", self.name, self.path.display());
        Ok(())
    }

    /// Record `path` as the selected track and persist immediately
    pub fn select(&mut self, path: &Path) -> Result<()> {
        self.selected = Some(path.to_path_buf());
        self.save()
    }
}

/// Directory holding the `*.playlist` files
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    directory: PathBuf,
}

impl PlaylistStore {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Result<Self> {
        let directory = directory.into();
        if !directory.exists() {
            fs::create_dir_all(&directory)?;
            info!("Created playlists directory: {}", directory.display());
        }
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Saved playlists, sorted by file name
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let mut found: Vec<PathBuf> = fs::read_dir(&self.directory)?
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry.path()),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.directory.display(), e);
                    None
                }
            })
            .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(PLAYLIST_EXTENSION))
            .collect();
        found.sort();
        Ok(found)
    }

    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlayerError::Validation("playlist name is empty".to_string()));
        }
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(PlayerError::Validation(format!("'{name}' is not a valid playlist name")));
        }
        Ok(self.directory.join(format!("{name}.{PLAYLIST_EXTENSION}")))
    }

    pub fn open(&self, path: &Path) -> Result<PlayList> {
        PlayList::load(path)
    }

    /// Save the tracklist's full order and current track under `name`.
    /// An existing playlist of that name is overwritten in place.
    pub fn create(&self, name: &str, tracklist: &Tracklist) -> Result<PlayList> {
        let mut playlist = PlayList::load(self.path_for(name)?)?;
        playlist.songs = tracklist.paths();
        playlist.selected = tracklist.current_path().map(Path::to_path_buf);
        playlist.save()?;
        Ok(playlist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tracklist::PlaylistOrder;
    use tempfile::tempdir;

    fn tracklist(names: &[&str]) -> Tracklist {
        let mut list = Tracklist::new(PlaylistOrder::Ascending);
        list.set_tracks(names.iter().map(|n| PathBuf::from(format!("/music/{n}"))).collect(), 0, false);
        list
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let playlist = PlayList::load(dir.path().join("new.playlist")).unwrap();

        assert_eq!(playlist.name, "new");
        assert!(playlist.songs.is_empty());
        assert!(!playlist.exists());
    }

    #[test]
    fn save_then_load_keeps_songs_and_selection() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mix.playlist");

        let mut playlist = PlayList::load(&path).unwrap();
        playlist.songs = vec![PathBuf::from("/music/b.mp3"), PathBuf::from("/music/a.mp3")];
        playlist.selected = Some(PathBuf::from("/music/a.mp3"));
        playlist.save().unwrap();

        let reloaded = PlayList::load(&path).unwrap();
        assert_eq!(reloaded.songs, playlist.songs);
        assert_eq!(reloaded.selected, playlist.selected);
        assert!(reloaded.exists());
    }

    #[test]
    fn saved_paths_are_absolute() {
        let dir = tempdir().unwrap();
        let mut playlist = PlayList::load(dir.path().join("rel.playlist")).unwrap();
        playlist.songs = vec![PathBuf::from("relative/song.mp3")];
        playlist.save().unwrap();

        assert!(playlist.songs[0].is_absolute());
        assert!(playlist.songs[0].ends_with("relative/song.mp3"));
    }

    #[test]
    fn file_layout_and_deleted_songs_survive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("old.playlist");
        fs::write(
            &path,
            r#"{"name": "renamed", "songs": ["/music/a.mp3"], "deleted_songs": ["/music/gone.mp3"]}"#,
        )
        .unwrap();

        let mut playlist = PlayList::load(&path).unwrap();
        assert_eq!(playlist.name, "old");
        assert_eq!(playlist.selected, None);
        playlist.select(Path::new("/music/a.mp3")).unwrap();

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["selected"], "/music/a.mp3");
        assert_eq!(raw["deleted_songs"][0], "/music/gone.mp3");
        assert!(fs::read_to_string(&path).unwrap().contains("\n  \"name\""));
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.playlist");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PlayList::load(&path), Err(PlayerError::Json(_))));
    }

    #[test]
    fn store_lists_only_playlists() {
        let dir = tempdir().unwrap();
        let store = PlaylistStore::new(dir.path().join("lists")).unwrap();
        store.create("zulu", &tracklist(&["a.mp3"])).unwrap();
        store.create("alpha", &tracklist(&["b.mp3"])).unwrap();
        fs::write(store.directory().join("notes.txt"), "x").unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["alpha.playlist", "zulu.playlist"]);
    }

    #[test]
    fn store_rejects_bad_names() {
        let dir = tempdir().unwrap();
        let store = PlaylistStore::new(dir.path()).unwrap();
        for name in ["", "  ", "a/b", "..", ".hidden"] {
            assert!(matches!(store.path_for(name), Err(PlayerError::Validation(_))), "{name:?}");
        }
        assert_eq!(store.path_for(" chill ").unwrap(), dir.path().join("chill.playlist"));
    }

    #[test]
    fn create_snapshots_the_unfiltered_order() {
        let dir = tempdir().unwrap();
        let store = PlaylistStore::new(dir.path()).unwrap();
        let mut list = tracklist(&["one.mp3", "two.mp3", "three.mp3"]);
        list.go_to(2);
        list.select_cursor();
        list.filter("three");

        let playlist = store.create("snap", &list).unwrap();
        let reloaded = store.open(&playlist.path).unwrap();
        assert_eq!(reloaded.songs.len(), 3);
        assert_eq!(reloaded.selected, Some(PathBuf::from("/music/two.mp3")));
    }
}
