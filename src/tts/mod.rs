//! Text-to-speech module.
//!
//! Defines the engine boundary the podcast driver talks to and the Kokoro
//! implementation built on sherpa-rs.

mod engine;
mod synthesizer;

pub use engine::{EngineError, SpeechEngine, SynthesisRequest};
pub use synthesizer::{EngineOptions, KokoroEngine};
