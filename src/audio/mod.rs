pub mod playlist;
pub mod probe;
pub mod scanner;
pub mod session;
pub mod similarity;
pub mod track;
pub mod tracklist;
pub mod transport;

pub use playlist::{PlayList, PlaylistStore};
pub use scanner::MusicScanner;
pub use session::{PlaybackSession, PlaybackState, Progress};
pub use track::Track;
pub use tracklist::{PlaylistOrder, Tracklist};
pub use transport::AudioTransport;
#[cfg(feature = "audio")]
pub use transport::RodioTransport;
