use crate::error::{DatasetError, Result};
use minimp3::{Decoder, Error as Mp3Error, Frame};
use rubato::{FftFixedInOut, Resampler};
use std::error::Error;
use std::fs::File;
use std::path::Path;

/// Sample rate every waveform in the corpus is resampled to.
pub const TARGET_SAMPLE_RATE: u32 = 22050;
const RESAMPLE_CHUNK: usize = 1024;

/// Decoded mono audio at its native sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Convert a raw i16 audio sample to a normalized f32 value in [-1.0, 1.0)
pub fn i16_to_f32(sample: i16) -> f32 {
    sample as f32 / 32768.0
}

/// Average interleaved frames down to a single channel.
fn mix_to_mono(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Load all samples from a WAV file, mixed down to mono.
///
/// Integer PCM of any bit depth is scaled to [-1.0, 1.0]; float PCM is
/// passed through.
pub fn decode_wav(path: &Path) -> Result<DecodedAudio> {
    let reader = hound::WavReader::open(path).map_err(|e| DatasetError::decode(path, e))?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| DatasetError::decode(path, e))?,
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| DatasetError::decode(path, e))?
        }
    };
    Ok(DecodedAudio {
        samples: mix_to_mono(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

/// Load samples from an MP3 file using the `minimp3` decoder, mixed down
/// to mono.
pub fn decode_mp3(path: &Path) -> Result<DecodedAudio> {
    let file = File::open(path).map_err(|e| DatasetError::decode(path, e))?;
    let mut decoder = Decoder::new(file);
    let mut samples = Vec::new();
    let mut sample_rate = 0u32;
    loop {
        match decoder.next_frame() {
            Ok(Frame {
                data,
                sample_rate: sr,
                channels,
                ..
            }) => {
                if sample_rate == 0 {
                    sample_rate = sr as u32;
                }
                let frame: Vec<f32> = data.iter().map(|&s| i16_to_f32(s)).collect();
                samples.extend(mix_to_mono(&frame, channels));
            }
            Err(Mp3Error::Eof) => break,
            Err(e) => return Err(DatasetError::decode(path, e)),
        }
    }
    if sample_rate == 0 {
        return Err(DatasetError::decode(path, "no MP3 frames decoded"));
    }
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

/// Decode an audio file, choosing the decoder from its extension.
pub fn decode(path: &Path) -> Result<DecodedAudio> {
    let is_mp3 = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("mp3"));
    if is_mp3 {
        decode_mp3(path)
    } else {
        decode_wav(path)
    }
}

/// Resample mono samples from `from_rate` to `to_rate` using rubato.
///
/// The input is fed in fixed chunks, the tail is zero-padded and the output
/// is trimmed to `round(len * to_rate / from_rate)` samples, never fewer
/// than one.
pub fn resample(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> std::result::Result<Vec<f32>, Box<dyn Error + Send + Sync>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    let expected = ((samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize)
        .max(1);
    let mut resampler =
        FftFixedInOut::<f32>::new(from_rate as usize, to_rate as usize, RESAMPLE_CHUNK, 1)?;

    let mut result = Vec::with_capacity(expected + resampler.output_frames_next());
    let mut pos = 0usize;
    while result.len() < expected {
        let needed = resampler.input_frames_next();
        let mut chunk = vec![0.0f32; needed];
        if pos < samples.len() {
            let end = (pos + needed).min(samples.len());
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);
        }
        pos += needed;
        let input = vec![chunk];
        let output = resampler.process(&input, None)?;
        result.extend_from_slice(&output[0]);
    }
    result.truncate(expected);
    Ok(result)
}

/// Decode `path` into mono samples at [`TARGET_SAMPLE_RATE`].
///
/// Files that decode to no samples are reported as decode errors.
pub fn load_audio(path: &Path) -> Result<Vec<f32>> {
    let decoded = decode(path)?;
    if decoded.samples.is_empty() {
        return Err(DatasetError::decode(path, "file contains no audio samples"));
    }
    resample(&decoded.samples, decoded.sample_rate, TARGET_SAMPLE_RATE)
        .map_err(|e| DatasetError::decode(path, e))
}

/// Scale `samples` so the peak absolute amplitude is 1.0.
///
/// Silent input is left untouched.
pub fn normalize_peak(samples: &mut [f32]) {
    let peak = samples.iter().fold(0.0f32, |acc, &s| acc.max(s.abs()));
    if peak < f32::MIN_POSITIVE {
        return;
    }
    for s in samples.iter_mut() {
        *s /= peak;
    }
}

/// Right-pad with zeros or truncate to exactly `length` samples.
pub fn fix_length(mut samples: Vec<f32>, length: usize) -> Vec<f32> {
    samples.resize(length, 0.0);
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, spec: hound::WavSpec, samples: &[i16]) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }

    fn spec(channels: u16, sample_rate: u32) -> hound::WavSpec {
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        }
    }

    #[test]
    fn decodes_16_bit_wav_to_unit_range() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.wav");
        write_wav(&path, spec(1, TARGET_SAMPLE_RATE), &[0, 16384, -32768]);

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.sample_rate, TARGET_SAMPLE_RATE);
        assert_eq!(decoded.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn decodes_24_bit_wav_to_unit_range() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("deep.wav");
        let spec = hound::WavSpec {
            bits_per_sample: 24,
            ..spec(1, TARGET_SAMPLE_RATE)
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [4194304i32, -8388608] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        assert_eq!(decode(&path).unwrap().samples, vec![0.5, -1.0]);
    }

    #[test]
    fn decodes_float_wav_unchanged() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("float.wav");
        let spec = hound::WavSpec {
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
            ..spec(1, TARGET_SAMPLE_RATE)
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.5f32, -0.25] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        assert_eq!(decode(&path).unwrap().samples, vec![0.5, -0.25]);
    }

    /// Silent MPEG-1 Layer III mono frames, 128 kbit/s at 44.1 kHz.
    fn silent_mp3(frames: usize) -> Vec<u8> {
        const FRAME_LEN: usize = 417;
        let mut frame = vec![0u8; FRAME_LEN];
        frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0xC0]);
        frame.repeat(frames)
    }

    #[test]
    fn decodes_mp3_frames() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silence.MP3");
        std::fs::write(&path, silent_mp3(12)).unwrap();

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.sample_rate, 44100);
        assert!(!decoded.samples.is_empty());
        assert!(decoded.samples.len() <= 12 * 1152);
        assert!(decoded.samples.iter().all(|s| s.abs() < 1e-6));

        let resampled = load_audio(&path).unwrap();
        let expected = (decoded.samples.len() as f64 / 2.0).round() as usize;
        assert_eq!(resampled.len(), expected);
    }

    #[test]
    fn single_sample_at_high_rate_survives_resampling() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tiny.wav");
        write_wav(&path, spec(1, 48000), &[1000]);

        assert_eq!(load_audio(&path).unwrap().len(), 1);
        assert_eq!(resample(&[0.1, 0.2], 96000, TARGET_SAMPLE_RATE).unwrap().len(), 1);
    }

    #[test]
    fn stereo_is_averaged_to_mono() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("stereo.wav");
        write_wav(&path, spec(2, TARGET_SAMPLE_RATE), &[16384, 0, -16384, -16384]);

        let decoded = decode(&path).unwrap();
        assert_eq!(decoded.samples, vec![0.25, -0.5]);
    }

    #[test]
    fn native_rate_audio_is_not_resampled() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a.wav");
        let raw: Vec<i16> = (0..500).map(|i| (i * 37 % 2000) as i16).collect();
        write_wav(&path, spec(1, TARGET_SAMPLE_RATE), &raw);

        let samples = load_audio(&path).unwrap();
        let expected: Vec<f32> = raw.iter().map(|&s| s as f32 / 32768.0).collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn resampled_length_follows_rate_ratio() {
        let input: Vec<f32> = (0..16000).map(|i| (i as f32 * 0.05).sin()).collect();
        let output = resample(&input, 16000, TARGET_SAMPLE_RATE).unwrap();
        assert_eq!(output.len(), 22050);

        let short = resample(&input[..100], 44100, TARGET_SAMPLE_RATE).unwrap();
        assert_eq!(short.len(), 50);
    }

    #[test]
    fn empty_and_garbage_files_fail_to_decode() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty.wav");
        write_wav(&empty, spec(1, TARGET_SAMPLE_RATE), &[]);
        assert!(matches!(
            load_audio(&empty),
            Err(DatasetError::AudioDecode { .. })
        ));

        let garbage = tmp.path().join("garbage.wav");
        std::fs::write(&garbage, b"definitely not a riff header").unwrap();
        assert!(matches!(
            load_audio(&garbage),
            Err(DatasetError::AudioDecode { .. })
        ));

        let zero_bytes = tmp.path().join("zero.mp3");
        std::fs::write(&zero_bytes, b"").unwrap();
        assert!(matches!(
            load_audio(&zero_bytes),
            Err(DatasetError::AudioDecode { .. })
        ));
    }

    #[test]
    fn normalization_scales_peak_and_is_idempotent() {
        let mut samples = vec![0.1, -0.25, 0.2];
        normalize_peak(&mut samples);
        assert_eq!(samples, vec![0.4, -1.0, 0.8]);

        let once = samples.clone();
        normalize_peak(&mut samples);
        assert_eq!(samples, once);
    }

    #[test]
    fn normalizing_silence_is_a_no_op() {
        let mut silence = vec![0.0f32; 64];
        normalize_peak(&mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn fix_length_pads_tail_and_keeps_prefix() {
        let source: Vec<f32> = (1..=6).map(|v| v as f32).collect();
        assert_eq!(
            fix_length(source.clone(), 8),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 0.0, 0.0]
        );
        assert_eq!(fix_length(source.clone(), 4), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(fix_length(source.clone(), 6), source);
    }
}
