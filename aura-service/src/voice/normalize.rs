//! Decode recorded audio and convert it to the format recognizers expect:
//! mono, 16 kHz, 16-bit PCM WAV.

use std::io::Cursor;
use std::ops::RangeInclusive;
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::error::TranscriptionError;

pub const TARGET_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone)]
pub struct NormalizedAudio {
    /// 16-bit mono WAV file bytes
    pub wav: Vec<u8>,
    pub sample_count: usize,
}

impl NormalizedAudio {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.sample_count as f64 / TARGET_SAMPLE_RATE as f64)
    }

    pub fn is_silent(&self) -> bool {
        self.sample_count == 0
    }
}

/// Input sample rates accepted from a WAV header
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8_000..=192_000;

/// Decode a WAV clip and convert it to mono 16 kHz PCM.
///
/// The header is checked before any samples are decoded: the sample rate
/// must be in [`SAMPLE_RATE_RANGE`] and the clip no longer than
/// `max_seconds`.
pub fn normalize(bytes: &[u8], max_seconds: u64) -> Result<NormalizedAudio, TranscriptionError> {
    let reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| TranscriptionError::Failure(format!("Unsupported audio: {}", e)))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(TranscriptionError::Failure(
            "Audio header has no channels".to_string(),
        ));
    }
    if !SAMPLE_RATE_RANGE.contains(&spec.sample_rate) {
        return Err(TranscriptionError::Failure(format!(
            "Unsupported sample rate: {} Hz",
            spec.sample_rate
        )));
    }

    let frames = u64::from(reader.duration());
    if frames > max_seconds.saturating_mul(u64::from(spec.sample_rate)) {
        return Err(TranscriptionError::Failure(format!(
            "Recording is {} seconds, the limit is {}",
            frames / u64::from(spec.sample_rate),
            max_seconds
        )));
    }

    let interleaved = read_samples(reader, spec)?;
    let mono = downmix(&interleaved, spec.channels as usize);
    let resampled = resample_linear(&mono, spec.sample_rate, TARGET_SAMPLE_RATE);
    let wav = encode_pcm16(&resampled)?;

    Ok(NormalizedAudio {
        wav,
        sample_count: resampled.len(),
    })
}

/// Read every sample as f32 in [-1.0, 1.0]
fn read_samples(
    reader: WavReader<Cursor<&[u8]>>,
    spec: WavSpec,
) -> Result<Vec<f32>, TranscriptionError> {
    let decode_err = |e: hound::Error| TranscriptionError::Failure(format!("Corrupt audio: {}", e));

    match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map_err(decode_err))
            .collect(),
        SampleFormat::Int => {
            let scale = (1u64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale).map_err(decode_err))
                .collect()
        }
    }
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn resample_linear(samples: &[f32], from_rate: u32, to_rate: u32) -> Vec<f32> {
    if from_rate == to_rate || samples.is_empty() {
        return samples.to_vec();
    }

    let ratio = from_rate as f64 / to_rate as f64;
    let out_len = ((samples.len() as f64) / ratio).round() as usize;
    let last = samples.len() - 1;

    (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = (pos.floor() as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            let next = samples[(idx + 1).min(last)];
            samples[idx] * (1.0 - frac) + next * frac
        })
        .collect()
}

fn encode_pcm16(samples: &[f32]) -> Result<Vec<u8>, TranscriptionError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: TARGET_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let encode_err = |e: hound::Error| TranscriptionError::Failure(format!("WAV encoding: {}", e));

    let mut buf = Vec::with_capacity(44 + samples.len() * 2);
    {
        let mut writer = WavWriter::new(Cursor::new(&mut buf), spec).map_err(encode_err)?;
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
            writer.write_sample(v).map_err(encode_err)?;
        }
        writer.finalize().map_err(encode_err)?;
    }
    Ok(buf)
}
