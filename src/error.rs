// Error taxonomy for the playback engine
// Nothing in here is fatal: callers either show a notification or skip ahead

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// Directory, file or playlist path does not exist
    #[error("path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Track could not be decoded or loaded into the transport
    #[error("cannot play '{}': {reason}", path.display())]
    Media { path: PathBuf, reason: String },

    /// Bad user input, e.g. a non-numeric "go to" position
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("playlist format error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlayerError {
    pub fn media(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PlayerError::Media {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Media errors are handled by skipping the track; everything else is
    /// worth a notification
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, PlayerError::Media { .. })
    }
}

pub type Result<T> = std::result::Result<T, PlayerError>;
