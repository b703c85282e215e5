//! Audio resampling using rubato's FFT-based resampler.
//!
//! Segments normally come back from the engine at one rate. When a segment does
//! not, it is converted to the episode rate before it is appended.

use anyhow::{Context, Result};
use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Chunk size for FFT-based resampling (provides good quality and performance).
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing (higher = better quality but more CPU).
const SUB_CHUNKS: usize = 2;

/// Resample a mono buffer from one sample rate to another.
///
/// The resampler's output delay is discarded and the tail is flushed with
/// silence, so the result has exactly `round(len * to_rate / from_rate)` samples
/// and stays time-aligned with the input.
///
/// # Arguments
/// * `samples` - Input audio samples
/// * `from_rate` - Input sample rate (e.g., 22050)
/// * `to_rate` - Output sample rate (e.g., 24000)
///
/// # Returns
/// Resampled audio samples at the target rate
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )
    .context("Failed to create resampler")?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f32; output_frames_max];

    let delay = resampler.output_delay();
    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    let wanted = delay + expected_len;
    let mut output = Vec::with_capacity(wanted + output_frames_max);

    // Input chunks plus enough silent chunks to flush the delay line.
    let max_chunks = samples.len().div_ceil(CHUNK_SIZE) + delay.div_ceil(CHUNK_SIZE) + 4;
    let mut input_chunk = vec![0.0f32; CHUNK_SIZE];
    let mut pos = 0;
    let mut chunks = 0;

    while output.len() < wanted {
        if chunks >= max_chunks {
            anyhow::bail!("Resampler produced {} of {} expected frames", output.len(), wanted);
        }

        let end = (pos + CHUNK_SIZE).min(samples.len());
        let taken = end.saturating_sub(pos);
        input_chunk[..taken].copy_from_slice(&samples[pos.min(samples.len())..end]);
        input_chunk[taken..].fill(0.0);

        let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE).context("Failed to create input adapter")?;
        let mut output_adapter = InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max).context("Failed to create output adapter")?;

        let (_, frames_written) = resampler
            .process_into_buffer(&input_adapter, &mut output_adapter, None)
            .map_err(|e| anyhow::anyhow!("Resampling error: {}", e))?;
        output.extend_from_slice(&output_buffer[..frames_written]);

        pos = end;
        chunks += 1;
    }

    output.drain(..delay);
    output.truncate(expected_len);
    Ok(output)
}
