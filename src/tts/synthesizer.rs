//! Text-to-speech engine backed by Kokoro models through sherpa-rs.

use std::path::PathBuf;

use sherpa_rs::OnnxConfig;
use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use tracing::{debug, info};

use super::engine::{EngineError, SpeechEngine, SynthesisRequest};
use crate::audio::Waveform;
use crate::config::voices::{self, VoiceLanguage};
use crate::config::{Precision, Provider};
use crate::script::VoiceBinding;

/// Where and how to load the Kokoro model.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub model_dir: PathBuf,  // Directory holding the Kokoro model packages
    pub provider: Provider,  // Execution device
    pub precision: Precision, // Model weights precision
    pub num_threads: usize,  // ONNX runtime threads
    pub speed: f32,          // Native speech speed multiplier
    pub debug: bool,         // sherpa-onnx debug output
}

impl EngineOptions {
    /// Directory of the model package for the configured precision.
    pub fn package_dir(&self) -> PathBuf {
        let package = match self.precision {
            Precision::Fp32 => "kokoro-multi-lang-v1_0",
            Precision::Int8 => "kokoro-int8-multi-lang-v1_0",
        };
        self.model_dir.join("tts").join(package)
    }

    /// Path to the Kokoro ONNX model.
    pub fn model_path(&self) -> PathBuf {
        let file = match self.precision {
            Precision::Fp32 => "model.onnx",
            Precision::Int8 => "model.int8.onnx",
        };
        self.package_dir().join(file)
    }

    /// Path to the voices.bin speaker embeddings.
    pub fn voices_path(&self) -> PathBuf {
        self.package_dir().join("voices.bin")
    }

    /// Path to the tokens file.
    pub fn tokens_path(&self) -> PathBuf {
        self.package_dir().join("tokens.txt")
    }

    /// Path to the espeak-ng data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.package_dir().join("espeak-ng-data")
    }

    /// Path to the dict directory (Chinese segmentation).
    pub fn dict_dir(&self) -> PathBuf {
        self.package_dir().join("dict")
    }

    /// Comma-separated lexicon list covering every bound voice.
    pub fn lexicon(&self, languages: &[VoiceLanguage]) -> String {
        let mut files: Vec<&str> = Vec::new();
        for file in languages.iter().flat_map(|l| l.lexicons().iter().copied()) {
            if !files.contains(&file) {
                files.push(file);
            }
        }
        files.iter().map(|f| self.package_dir().join(f).to_string_lossy().to_string()).collect::<Vec<_>>().join(",")
    }
}

/// Kokoro TTS engine shared by every segment of a run.
pub struct KokoroEngine {
    tts: KokoroTts, // Kokoro TTS engine
    speed: f32,     // Speech speed multiplier
}

impl KokoroEngine {
    /// Load the Kokoro model once for the whole run.
    ///
    /// The voice binding decides which lexicons and espeak language are loaded, so
    /// both roles can be read with the same engine instance.
    ///
    /// # Errors
    /// Returns [`EngineError::Load`] if a model file is missing, and
    /// [`EngineError::UnknownSpeaker`] if a bound voice is not a Kokoro voice.
    pub fn load(options: &EngineOptions, binding: &VoiceBinding) -> Result<Self, EngineError> {
        let required_files = [options.model_path(), options.voices_path(), options.tokens_path(), options.data_dir()];
        for path in &required_files {
            if !path.exists() {
                return Err(EngineError::Load(format!("required model file not found: {}", path.display())));
            }
        }

        let mut languages = Vec::new();
        for name in [&binding.host, &binding.guest] {
            let voice = voices::get_voice(name).ok_or_else(|| EngineError::UnknownSpeaker(name.clone()))?;
            languages.push(voice.language);
        }
        let lang = languages.iter().find_map(|l| l.espeak_lang()).unwrap_or_default();

        info!("Initializing Kokoro TTS engine with {} provider ({} threads)", options.provider, options.num_threads);
        info!("Model: {}", options.model_path().display());

        let tts_config = KokoroTtsConfig {
            model: options.model_path().to_string_lossy().to_string(),
            voices: options.voices_path().to_string_lossy().to_string(),
            tokens: options.tokens_path().to_string_lossy().to_string(),
            data_dir: options.data_dir().to_string_lossy().to_string(),
            dict_dir: options.dict_dir().to_string_lossy().to_string(),
            lexicon: options.lexicon(&languages),
            lang: lang.to_string(),
            length_scale: 1.0, // speed is applied per call instead
            onnx_config: OnnxConfig {
                provider: options.provider.as_sherpa_provider().to_string(),
                num_threads: options.num_threads.try_into().unwrap_or(2),
                debug: options.debug,
            },
            common_config: CommonTtsConfig { max_num_sentences: 1, ..Default::default() }, // Kokoro only supports 1
        };

        let tts = KokoroTts::new(tts_config);

        Ok(Self { tts, speed: options.speed })
    }
}

impl SpeechEngine for KokoroEngine {
    fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Waveform, EngineError> {
        if request.text.trim().is_empty() {
            return Err(EngineError::EmptyText);
        }

        let voice = voices::get_voice(request.speaker).ok_or_else(|| EngineError::UnknownSpeaker(request.speaker.to_string()))?;
        if !voice.speaks(request.language) {
            return Err(EngineError::UnsupportedLanguage { speaker: request.speaker.to_string(), language: request.language.to_string() });
        }

        // Kokoro has no style input; delivery stays at the voice default
        if let Some(instruction) = request.instruction {
            debug!("Kokoro ignores delivery instructions: \"{}\"", instruction);
        }

        debug!("Synthesizing with {} (speaker ID {}): \"{}\"", request.speaker, voice.speaker_id, request.text);

        let audio = self
            .tts
            .create(request.text, voice.speaker_id, self.speed)
            .map_err(|e| EngineError::Generation(e.to_string()))?;

        if audio.sample_rate == 0 {
            return Err(EngineError::Generation("engine reported a zero sample rate".to_string()));
        }

        Ok(Waveform::new(audio.samples, audio.sample_rate))
    }
}
