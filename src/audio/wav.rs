//! WAV file output.

use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};

use super::Waveform;
use crate::config::WavFormat;

/// Write a mono waveform to a WAV file in one pass.
///
/// `Pcm16` clamps samples to [-1.0, 1.0] before scaling; `Float32` writes them as-is.
pub fn save_wav(path: &Path, waveform: &Waveform, format: WavFormat) -> Result<()> {
    let spec = match format {
        WavFormat::Pcm16 => WavSpec { channels: 1, sample_rate: waveform.sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int },
        WavFormat::Float32 => WavSpec { channels: 1, sample_rate: waveform.sample_rate, bits_per_sample: 32, sample_format: SampleFormat::Float },
    };

    let mut writer = WavWriter::create(path, spec).with_context(|| format!("Failed to create WAV file: {}", path.display()))?;

    match format {
        WavFormat::Pcm16 => {
            for &sample in &waveform.samples {
                writer.write_sample(to_pcm16(sample))?;
            }
        }
        WavFormat::Float32 => {
            for &sample in &waveform.samples {
                writer.write_sample(sample)?;
            }
        }
    }

    writer.finalize().with_context(|| format!("Failed to finalize WAV file: {}", path.display()))?;
    Ok(())
}

/// Convert a float sample to 16-bit PCM.
fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
