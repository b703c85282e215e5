//! Audio buffers and processing for episode assembly.
//!
//! Holds the waveform type returned by the engine, the per-segment
//! post-processing steps, resampling via rubato and WAV output via hound.

pub mod resampler;
mod wav;
mod waveform;

pub use wav::save_wav;
pub use waveform::Waveform;
