//! The synthesis engine boundary.

use thiserror::Error;

use crate::audio::Waveform;

/// One synthesis call: a line of text read by one voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisRequest<'a> {
    pub text: &'a str,
    pub language: &'a str,
    pub speaker: &'a str,
    /// Delivery style; `None` means the engine's neutral delivery
    pub instruction: Option<&'a str>,
}

/// Errors reported by a synthesis engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to load synthesis engine: {0}")]
    Load(String),

    #[error("unknown speaker '{0}'")]
    UnknownSpeaker(String),

    #[error("speaker '{speaker}' does not support language '{language}'")]
    UnsupportedLanguage { speaker: String, language: String },

    #[error("cannot synthesize empty text")]
    EmptyText,

    #[error("speech generation failed: {0}")]
    Generation(String),
}

/// A loaded text-to-speech engine.
///
/// Engines are driven from a single thread, one call at a time.
pub trait SpeechEngine {
    /// Synthesize one line of text, returning its samples and sample rate.
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Waveform, EngineError>;
}
