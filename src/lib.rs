// cplayer library - tracklist and playback session engine
// The binary is a thin terminal front end over these modules

pub mod audio;  // tracks, tracklist, playlists, transport and session
pub mod config; // settings file
pub mod error;  // engine error type
#[cfg(feature = "tui")]
pub mod ui;     // terminal interface

pub use audio::{PlayList, PlaybackSession, PlaylistOrder, PlaylistStore, Track, Tracklist};
pub use config::Config;
pub use error::{PlayerError, Result};
