use crate::error::Result;
use std::path::Path;

/// The audio device as the playback session sees it.
///
/// A transport holds at most one loaded track. `play` always restarts the
/// loaded track at the given offset, which is how seeking is done.
pub trait AudioTransport {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn play(&mut self, start_at_seconds: f64) -> Result<()>;
    fn pause(&mut self);
    fn unpause(&mut self);
    fn stop(&mut self);

    /// True while audio is playing or paused mid-track
    fn is_busy(&self) -> bool;
    fn is_paused(&self) -> bool;

    /// Milliseconds played since the last `play`, pauses excluded
    fn elapsed_ms(&self) -> u64;

    fn volume(&self) -> f32;
    fn set_volume(&mut self, volume: f32);
}

#[cfg(feature = "audio")]
pub use self::rodio_transport::RodioTransport;

#[cfg(feature = "audio")]
mod rodio_transport {
    use super::AudioTransport;
    use crate::error::{PlayerError, Result};
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
    use std::fs::File;
    use std::io::BufReader;
    use std::path::{Path, PathBuf};
    use std::time::{Duration, Instant};
    use tracing::debug;

    pub struct RodioTransport {
        _stream: OutputStream,
        stream_handle: OutputStreamHandle,
        sink: Option<Sink>,
        loaded: Option<PathBuf>,
        volume: f32,
        started_at: Option<Instant>,
        elapsed_before_pause: Duration,
    }

    impl RodioTransport {
        pub fn new(volume: f32) -> Result<Self> {
            let (stream, stream_handle) = OutputStream::try_default()
                .map_err(|e| PlayerError::media("default output device", e))?;

            Ok(Self {
                _stream: stream,
                stream_handle,
                sink: None,
                loaded: None,
                volume: volume.clamp(0.0, 1.0),
                started_at: None,
                elapsed_before_pause: Duration::ZERO,
            })
        }

        fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>> {
            let file = File::open(path).map_err(|e| PlayerError::media(path, e))?;
            Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::media(path, e))
        }
    }

    impl AudioTransport for RodioTransport {
        fn load(&mut self, path: &Path) -> Result<()> {
            self.stop();
            // Decode the header now so broken files fail at load time
            Self::open_decoder(path)?;
            self.loaded = Some(path.to_path_buf());
            debug!("Loaded {}", path.display());
            Ok(())
        }

        fn play(&mut self, start_at_seconds: f64) -> Result<()> {
            let path = self
                .loaded
                .clone()
                .ok_or_else(|| PlayerError::Validation("no track loaded".to_string()))?;

            if let Some(old) = self.sink.take() {
                old.stop();
            }

            let source = Self::open_decoder(&path)?;
            let sink = Sink::try_new(&self.stream_handle).map_err(|e| PlayerError::media(&path, e))?;
            sink.set_volume(self.volume);

            let offset = Duration::from_secs_f64(start_at_seconds.max(0.0));
            sink.append(source.skip_duration(offset));

            self.sink = Some(sink);
            self.started_at = Some(Instant::now());
            self.elapsed_before_pause = Duration::ZERO;
            Ok(())
        }

        fn pause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.pause();
                if let Some(started) = self.started_at.take() {
                    self.elapsed_before_pause += started.elapsed();
                }
            }
        }

        fn unpause(&mut self) {
            if let Some(sink) = &self.sink {
                sink.play();
                if self.started_at.is_none() {
                    self.started_at = Some(Instant::now());
                }
            }
        }

        fn stop(&mut self) {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.started_at = None;
            self.elapsed_before_pause = Duration::ZERO;
        }

        fn is_busy(&self) -> bool {
            self.sink.as_ref().map_or(false, |sink| !sink.empty())
        }

        fn is_paused(&self) -> bool {
            self.sink.as_ref().map_or(false, |sink| sink.is_paused())
        }

        fn elapsed_ms(&self) -> u64 {
            let running = self.started_at.map_or(Duration::ZERO, |s| s.elapsed());
            (self.elapsed_before_pause + running).as_millis() as u64
        }

        fn volume(&self) -> f32 {
            self.volume
        }

        fn set_volume(&mut self, volume: f32) {
            let volume = volume.clamp(0.0, 1.0);
            if (volume - self.volume).abs() > f32::EPSILON {
                debug!("Volume {:.1} -> {:.1}", self.volume, volume);
            }
            self.volume = volume;
            if let Some(sink) = &self.sink {
                sink.set_volume(volume);
            }
        }
    }
}
