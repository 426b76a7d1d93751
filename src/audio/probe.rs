// Thin symphonia wrappers: header probing for duration, full decode for samples

use crate::error::{PlayerError, Result};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

/// What the container header tells us about the playable stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
}

fn open_format(path: &Path) -> Result<Box<dyn FormatReader>> {
    let file = File::open(path).map_err(|e| PlayerError::media(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
        .map_err(|e| PlayerError::media(path, e))?;

    Ok(probed.format)
}

fn is_end_of_stream(err: &SymphoniaError) -> bool {
    match err {
        SymphoniaError::IoError(e) => e.kind() == ErrorKind::UnexpectedEof,
        SymphoniaError::ResetRequired => true,
        _ => false,
    }
}

/// Read duration and sample rate from the header, counting packets when the
/// container does not record a frame count (VBR mp3 without a Xing header)
pub fn probe_stream(path: &Path) -> Result<StreamInfo> {
    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlayerError::media(path, "no supported audio tracks found"))?;

    let track_id = track.id;
    let params = track.codec_params.clone();
    let sample_rate = params
        .sample_rate
        .ok_or_else(|| PlayerError::media(path, "unknown sample rate"))?;
    let channels = params.channels.map(|c| c.count() as u16).unwrap_or(1);

    let n_frames = match params.n_frames {
        Some(frames) => frames,
        None => {
            let mut frames = 0u64;
            loop {
                match format.next_packet() {
                    Ok(packet) if packet.track_id() == track_id => frames += packet.dur,
                    Ok(_) => {}
                    Err(e) if is_end_of_stream(&e) => break,
                    Err(e) => return Err(PlayerError::media(path, e)),
                }
            }
            frames
        }
    };

    let duration_seconds = match params.time_base {
        Some(time_base) => {
            let time = time_base.calc_time(n_frames);
            time.seconds as f64 + time.frac
        }
        None => n_frames as f64 / sample_rate as f64,
    };

    Ok(StreamInfo {
        duration_seconds,
        sample_rate,
        channels,
    })
}

/// Decode the whole stream into interleaved f32 samples
pub fn decode_samples(path: &Path) -> Result<Vec<f32>> {
    let mut format = open_format(path)?;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PlayerError::media(path, "no supported audio tracks found"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PlayerError::media(path, e))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(e) if is_end_of_stream(&e) => break,
            Err(e) => return Err(PlayerError::media(path, e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // corrupt frame, keep going
            Err(SymphoniaError::DecodeError(reason)) => {
                debug!("Skipping undecodable packet in {}: {}", path.display(), reason);
            }
            Err(e) => return Err(PlayerError::media(path, e)),
        }
    }

    Ok(samples)
}
