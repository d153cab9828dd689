//! Decodes an [`AudioSource`] into a mono [`super::AudioClip`].
//!
//! Containerized/compressed formats are decoded with `symphonia`, already
//! part of this codebase's audio stack. No resampling is performed — the
//! core engine accepts whatever native sample rate the source decodes to.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::conv::IntoSample;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use thiserror::Error;
use tracing::{debug, warn};

use super::{AudioClip, AudioSource};

#[derive(Error, Debug)]
pub enum AudioLoadError {
    #[error("failed to read audio file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to fetch remote audio: {0}")]
    Fetch(String),
    #[error("failed to decode audio: {0}")]
    Decode(String),
    #[error("audio clip is empty")]
    Empty,
}

/// Decode any supported [`AudioSource`] into a mono [`AudioClip`].
pub fn load(source: AudioSource) -> Result<AudioClip, AudioLoadError> {
    match source {
        AudioSource::Samples { samples, sample_rate } => {
            if samples.is_empty() {
                return Err(AudioLoadError::Empty);
            }
            Ok(AudioClip::from_samples(samples, sample_rate))
        }
        AudioSource::Path(path) => decode_file(&path),
        AudioSource::Url(url) => {
            let bytes = fetch_url(&url)?;
            decode_bytes(bytes, hint_from_path(Path::new(&url)))
        }
        AudioSource::Bytes(bytes) => decode_bytes(bytes, Hint::new()),
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>, AudioLoadError> {
    debug!(url, "fetching remote audio clip");
    let response = ureq::get(url)
        .call()
        .map_err(|e| AudioLoadError::Fetch(e.to_string()))?;
    let mut bytes = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| AudioLoadError::Fetch(e.to_string()))?;
    Ok(bytes)
}

fn decode_file(path: &Path) -> Result<AudioClip, AudioLoadError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file) as Box<dyn MediaSource>, Default::default());
    decode_stream(mss, hint_from_path(path))
}

fn decode_bytes(bytes: Vec<u8>, hint: Hint) -> Result<AudioClip, AudioLoadError> {
    let cursor = Cursor::new(bytes);
    let mss = MediaSourceStream::new(Box::new(cursor) as Box<dyn MediaSource>, Default::default());
    decode_stream(mss, hint)
}

fn hint_from_path(path: &Path) -> Hint {
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    hint
}

fn decode_stream(mss: MediaSourceStream, hint: Hint) -> Result<AudioClip, AudioLoadError> {
    let format_opts = FormatOptions::default();
    let metadata_opts = MetadataOptions::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &format_opts, &metadata_opts)
        .map_err(|e| AudioLoadError::Decode(format!("unrecognized audio container: {e}")))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AudioLoadError::Decode("no decodable audio track found".into()))?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioLoadError::Decode(format!("unsupported codec: {e}")))?;

    let track_id = track.id;
    let mut mono_samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(_)) => break, // end of stream
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioLoadError::Decode(format!("demux error: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_downmixed(decoded, &mut mono_samples),
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(error = %e, "skipping undecodable packet");
                continue;
            }
            Err(e) => return Err(AudioLoadError::Decode(format!("decode error: {e}"))),
        }
    }

    if mono_samples.is_empty() {
        return Err(AudioLoadError::Empty);
    }

    let sample_rate = if sample_rate == 0 { 44_100 } else { sample_rate };
    Ok(AudioClip::from_samples(mono_samples, sample_rate))
}

/// Downmix a decoded audio buffer to mono by averaging channels, appending
/// the result to `out`. Sample-format conversion is delegated to symphonia's
/// own `IntoSample<f32>` impls rather than hand-rolled scaling.
fn append_downmixed(decoded: AudioBufferRef, out: &mut Vec<f32>) {
    match decoded {
        AudioBufferRef::U8(buf) => downmix(&buf, out),
        AudioBufferRef::U16(buf) => downmix(&buf, out),
        AudioBufferRef::U24(buf) => downmix(&buf, out),
        AudioBufferRef::U32(buf) => downmix(&buf, out),
        AudioBufferRef::S8(buf) => downmix(&buf, out),
        AudioBufferRef::S16(buf) => downmix(&buf, out),
        AudioBufferRef::S24(buf) => downmix(&buf, out),
        AudioBufferRef::S32(buf) => downmix(&buf, out),
        AudioBufferRef::F32(buf) => downmix(&buf, out),
        AudioBufferRef::F64(buf) => downmix(&buf, out),
    }
}

fn downmix<S>(buf: &AudioBuffer<S>, out: &mut Vec<f32>)
where
    S: Sample + IntoSample<f32>,
{
    let spec = buf.spec();
    let channels = spec.channels.count().max(1);
    for i in 0..buf.frames() {
        let mut acc = 0.0f32;
        for ch in 0..channels {
            acc += IntoSample::<f32>::into_sample(buf.chan(ch)[i]);
        }
        out.push(acc / channels as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_source_passes_through() {
        let clip = load(AudioSource::Samples {
            samples: vec![0.0, 0.5, -0.5],
            sample_rate: 8000,
        })
        .unwrap();
        assert_eq!(clip.sample_rate, 8000);
        assert_eq!(clip.samples.len(), 3);
        assert!((clip.duration_seconds - 3.0 / 8000.0).abs() < 1e-9);
    }

    #[test]
    fn empty_samples_rejected() {
        let err = load(AudioSource::Samples {
            samples: vec![],
            sample_rate: 8000,
        });
        assert!(err.is_err());
    }
}
