use super::probe::{self, StreamInfo};
use crate::error::{PlayerError, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;

/// A playable file plus metadata decoded on first use.
///
/// Both caches are `OnceLock`s, so decoding happens exactly once per track even
/// if a background task races the UI for it.
#[derive(Debug, Clone)]
pub struct Track {
    path: PathBuf,
    stream: OnceLock<std::result::Result<StreamInfo, String>>,
    samples: OnceLock<Vec<f32>>,
}

impl Track {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            stream: OnceLock::new(),
            samples: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name including extension, what filter and search match against
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without extension, the sort key for ordered lists
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn stream_info(&self) -> &std::result::Result<StreamInfo, String> {
        self.stream.get_or_init(|| {
            probe::probe_stream(&self.path).map_err(|e| {
                warn!("Could not read audio header of {}: {}", self.path.display(), e);
                e.to_string()
            })
        })
    }

    /// Length in seconds; a failure is cached too, so a bad file is probed once
    pub fn duration(&self) -> Result<f64> {
        match self.stream_info() {
            Ok(info) => Ok(info.duration_seconds),
            Err(reason) => Err(PlayerError::media(&self.path, reason)),
        }
    }

    /// Known only after `duration()` succeeded
    pub fn sample_rate(&self) -> Option<u32> {
        match self.stream.get() {
            Some(Ok(info)) => Some(info.sample_rate),
            _ => None,
        }
    }

    pub fn channels(&self) -> Option<u16> {
        match self.stream.get() {
            Some(Ok(info)) => Some(info.channels),
            _ => None,
        }
    }

    /// Interleaved PCM for visualisation. Absent until the header decoded
    /// successfully, and absent for files whose body cannot be decoded.
    pub fn sample_buffer(&self) -> Option<&[f32]> {
        if !matches!(self.stream.get(), Some(Ok(_))) {
            return None;
        }

        let samples = self.samples.get_or_init(|| {
            probe::decode_samples(&self.path).unwrap_or_else(|e| {
                warn!("Could not decode samples of {}: {}", self.path.display(), e);
                Vec::new()
            })
        });

        if samples.is_empty() {
            None
        } else {
            Some(samples.as_slice())
        }
    }

    /// Up to `count` samples starting at `position_seconds`
    pub fn sample_window(&self, position_seconds: f64, count: usize) -> Option<&[f32]> {
        let rate = self.sample_rate()? as f64;
        let channels = self.channels().unwrap_or(1).max(1) as usize;
        let samples = self.sample_buffer()?;

        let start = (position_seconds.max(0.0) * rate) as usize * channels;
        if start >= samples.len() {
            return None;
        }
        let end = (start + count).min(samples.len());
        Some(&samples[start..end])
    }
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Track {}
