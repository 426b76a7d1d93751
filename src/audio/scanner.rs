use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Finds playable files under a directory (or accepts a single file)
#[derive(Debug, Clone)]
pub struct MusicScanner {
    supported_extensions: Vec<String>,
    recursive: bool,
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map_or(false, |n| n.starts_with('.'))
}

impl MusicScanner {
    pub fn new<S: AsRef<str>>(extensions: &[S], recursive: bool) -> Self {
        Self {
            supported_extensions: extensions
                .iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            recursive,
        }
    }

    pub fn from_config(config: &PlayerConfig) -> Self {
        Self::new(&config.extensions, config.recursive)
    }

    pub fn is_supported_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let normalized = ext.to_ascii_lowercase();
                self.supported_extensions.contains(&normalized)
            })
            .unwrap_or(false)
    }

    /// Audio files at `path`, sorted by file name. Fails with `NotFound` when the
    /// path does not exist; an existing path with no audio yields an empty list.
    pub fn scan<P: AsRef<Path>>(&self, path: P) -> Result<Vec<PathBuf>> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(PlayerError::NotFound(path.to_path_buf()));
        }

        if path.is_file() {
            let accepted = !is_hidden(path) && self.is_supported_file(path);
            debug!("Single file {} accepted={}", path.display(), accepted);
            return Ok(if accepted { vec![path.to_path_buf()] } else { Vec::new() });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let tracks: Vec<PathBuf> = WalkDir::new(path)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry: &DirEntry| entry.depth() == 0 || !is_hidden(entry.path()))
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(DirEntry::into_path)
            .filter(|p| self.is_supported_file(p))
            .collect();

        info!("Scanned {}: {} tracks", path.display(), tracks.len());
        Ok(tracks)
    }
}

impl Default for MusicScanner {
    fn default() -> Self {
        Self::new(&["mp3", "wav"], false)
    }
}
