//! Audio input and signal generators.
//!
//! Decoding happens entirely before the transform runs: the transform only
//! ever sees a mono sample buffer plus its sample rate, and any decode
//! failure is reported to the caller first.

use hound::{SampleFormat, WavReader};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Audio decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("audio stream reports zero channels")]
    NoChannels,
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// Load a WAV file as a mono signal.
///
/// Integer sample formats are normalized to `[-1.0, 1.0]`; multi-channel
/// files are mixed down by averaging.
///
/// # Arguments
/// * `path` - Path to the WAV file
///
/// # Returns
/// `(samples, sample_rate)`
///
/// # Errors
/// Returns `crate::Error::Audio` if the file cannot be read or decoded.
pub fn load_wav<P: AsRef<Path>>(path: P) -> crate::Result<(Vec<f32>, u32)> {
    let mut reader = WavReader::open(path).map_err(AudioError::Hound)?;
    let spec = reader.spec();

    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(AudioError::NoChannels.into());
    }

    let mut samples: Vec<f32> = Vec::new();
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for s in reader.samples::<f32>() {
                samples.push(s.map_err(AudioError::Hound)?);
            }
        }
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            for s in reader.samples::<i16>() {
                samples.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            for s in reader.samples::<i32>() {
                samples.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
    }

    Ok((to_mono(&samples, channels), spec.sample_rate))
}

/// Load an audio file of any supported format as a mono signal.
///
/// Uses symphonia to probe and decode compressed/container formats
/// (MP3, AAC, M4A, OGG, FLAC, WAV, ...). Multi-channel audio is mixed
/// down by averaging.
///
/// # Arguments
/// * `path` - Path to the audio file
///
/// # Returns
/// `(samples, sample_rate)`
///
/// # Errors
/// Returns `crate::Error::Audio` if the container cannot be probed, no
/// audio track is present, or decoding fails.
///
/// # Example
/// ```no_run
/// use quaver::io;
///
/// let (signal, sr) = io::load_audio("song.mp3").unwrap();
/// assert!(sr > 0);
/// assert!(!signal.is_empty());
/// ```
pub fn load_audio<P: AsRef<Path>>(path: P) -> crate::Result<(Vec<f32>, u32)> {
    let path_ref = path.as_ref();
    let mut hint = Hint::new();
    if let Some(ext) = path_ref.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path_ref)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(AudioError::from)?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);
    if channels == 0 {
        return Err(AudioError::NoChannels.into());
    }

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(AudioError::from)?;

    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break, // end of stream
            Err(e) => return Err(AudioError::from(e).into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(_)) => continue, // skip bad packet
            Err(e) => return Err(AudioError::from(e).into()),
        };

        let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sb.samples());
    }

    Ok((to_mono(&samples, channels), sample_rate))
}

/// Mix interleaved multi-channel samples down to mono by averaging.
///
/// # Arguments
/// * `interleaved` - Interleaved samples (frame-major)
/// * `channels` - Number of channels
pub fn to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Generate a pure sine tone.
///
/// # Arguments
/// * `frequency` - Tone frequency (Hz)
/// * `sr` - Sample rate
/// * `duration` - Length in seconds
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}

/// Generate silence.
///
/// # Arguments
/// * `sr` - Sample rate
/// * `duration` - Length in seconds
pub fn silence(sr: u32, duration: f32) -> Vec<f32> {
    vec![0.0; (duration * sr as f32) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_mono_averages_channels() {
        let interleaved = vec![1.0, -1.0, 0.5, 0.5, 0.0, 1.0];
        let mono = to_mono(&interleaved, 2);
        assert_eq!(mono.len(), 3);
        assert_relative_eq!(mono[0], 0.0);
        assert_relative_eq!(mono[1], 0.5);
        assert_relative_eq!(mono[2], 0.5);
    }

    #[test]
    fn test_to_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(to_mono(&samples, 1), samples);
    }

    #[test]
    fn test_tone_length_and_range() {
        let signal = tone(440.0, 22050, 0.5);
        assert_eq!(signal.len(), 11025);
        assert!(signal.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        assert!(signal.iter().any(|&v| v.abs() > 0.5));
    }

    #[test]
    fn test_silence() {
        let signal = silence(8000, 0.25);
        assert_eq!(signal.len(), 2000);
        assert!(signal.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_load_wav_roundtrip() {
        // Write a short stereo 16-bit file and read it back as mono.
        let dir = std::env::temp_dir();
        let path = dir.join("quaver_io_test.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..800 {
            let v = ((i as f32 * 0.05).sin() * 16000.0) as i16;
            writer.write_sample(v).unwrap(); // left
            writer.write_sample(v).unwrap(); // right
        }
        writer.finalize().unwrap();

        let (signal, sr) = load_wav(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(sr, 8000);
        assert_eq!(signal.len(), 800);
        // Both channels are identical, so the mixdown reproduces them.
        assert_relative_eq!(signal[10], (10.0f32 * 0.05).sin() * 16000.0 / 32768.0, epsilon = 1e-3);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_wav("/nonexistent/file.wav").is_err());
        assert!(load_audio("/nonexistent/file.mp3").is_err());
    }
}
