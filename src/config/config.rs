//! Application configuration and CLI argument parsing.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::voices;
use crate::podcast::DriverConfig;
use crate::script::{Episode, Role, RoleMap, validate_name};
use crate::tts::EngineOptions;

/// Hardware acceleration provider for the ONNX engine.
/// Auto-detected based on platform if not specified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// CPU inference (default fallback, always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration (requires a CUDA-enabled sherpa-rs build)
    Cuda,
    /// Apple CoreML acceleration (macOS only, uses Neural Engine)
    #[value(name = "coreml")]
    CoreMl,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sherpa_provider())
    }
}

impl Provider {
    /// Provider string understood by sherpa-rs.
    pub fn as_sherpa_provider(&self) -> &'static str {
        match self {
            Provider::Cpu => "cpu",
            Provider::Cuda => "cuda",
            Provider::CoreMl => "coreml",
        }
    }
}

/// Numeric precision of the Kokoro model weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    /// Full precision float32 model
    #[default]
    Fp32,
    /// Int8 quantized model (smaller, faster on CPU)
    Int8,
}

/// What to do when a segment comes back at a different sample rate than the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatePolicy {
    /// Convert the segment to the episode rate
    #[default]
    Resample,
    /// Fail the run
    Strict,
}

/// Sample encoding of the output WAV file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WavFormat {
    /// 16-bit signed integer PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Podcast renderer configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "podcast-tts")]
#[command(author, version, about = "Render a two-voice podcast episode from a script", long_about = None)]
pub struct AppConfig {
    /// List all available TTS voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show detailed information about a specific voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Episode document (JSON script with voices and settings)
    #[arg(long, short = 'e', env = "PODCAST_EPISODE")]
    pub episode: Option<PathBuf>,

    /// Directory the episode WAV file is written to
    #[arg(long, short = 'o', env = "PODCAST_OUTPUT_DIR", default_value = "podcast_output")]
    pub output_dir: PathBuf,

    /// Output file name without extension (overrides the episode name)
    #[arg(long)]
    pub name: Option<String>,

    /// Language tag for every segment (overrides the episode language)
    #[arg(long, short = 'l')]
    pub language: Option<String>,

    /// Voice for host lines (overrides the episode binding)
    #[arg(long)]
    pub host_voice: Option<String>,

    /// Voice for guest lines (overrides the episode binding)
    #[arg(long)]
    pub guest_voice: Option<String>,

    /// Directory containing the Kokoro model packages
    #[arg(long, short = 'd', env = "MODEL_DIR", default_value_os_t = default_model_dir())]
    pub model_dir: PathBuf,

    /// Hardware acceleration provider (auto-detected if not specified)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Model precision
    #[arg(long, value_enum, default_value = "fp32")]
    pub precision: Precision,

    /// Native Kokoro speech speed multiplier
    #[arg(long, default_value = "1.0", value_parser = parse_tts_speed)]
    pub tts_speed: f32,

    /// Engine threads (0 = auto-detect based on CPU cores)
    #[arg(long, default_value = "0")]
    pub num_threads: usize,

    /// Handling of segments whose sample rate differs from the first segment
    #[arg(long, value_enum, default_value = "resample")]
    pub rate_policy: RatePolicy,

    /// Output WAV sample encoding
    #[arg(long, value_enum, default_value = "pcm16")]
    pub wav_format: WavFormat,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    pub fn from_args() -> Self {
        let mut config = Self::parse();

        // Handle voice listing commands
        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_name) = config.voice_info {
            match voices::print_voice_info(voice_name) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config.normalize_thread_count();
        config
    }

    /// Pick an engine thread count when none was given.
    ///
    /// With CUDA a single thread is used since the GPU handles parallelism and
    /// extra CPU threads only contend for it. On CPU, synthesis is the only work
    /// in the process, so half the cores are used.
    fn normalize_thread_count(&mut self) {
        if self.num_threads == 0 {
            self.num_threads = if self.effective_provider() == Provider::Cuda { 1 } else { (num_cpus::get() / 2).max(1) };
        }
    }

    /// Get the effective engine provider.
    pub fn effective_provider(&self) -> Provider {
        self.provider.unwrap_or_else(detect_provider)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.episode.is_none() {
            anyhow::bail!("No episode document given (use --episode or PODCAST_EPISODE)");
        }

        if !self.model_dir.exists() {
            anyhow::bail!("Model directory does not exist: {}", self.model_dir.display());
        }

        if let Some(ref name) = self.name {
            validate_name(name)?;
        }

        Ok(())
    }

    /// Load and validate the episode document named on the command line.
    pub fn load_episode(&self) -> Result<Episode> {
        let path = self.episode.as_ref().context("No episode document given")?;
        let episode = Episode::load(path).with_context(|| format!("Failed to load episode {}", path.display()))?;
        episode.validate().with_context(|| format!("Invalid episode {}", path.display()))?;
        Ok(episode)
    }

    /// Load the episode and resolve the driver configuration for this run.
    pub fn prepare_run(&self) -> Result<(Episode, DriverConfig)> {
        let episode = self.load_episode()?;
        let driver = self.driver_config(&episode)?;
        Ok((episode, driver))
    }

    /// Build the driver configuration from the episode and command line overrides.
    pub fn driver_config(&self, episode: &Episode) -> Result<DriverConfig> {
        let voices = RoleMap::new(
            self.host_voice.clone().unwrap_or_else(|| episode.voices.host.clone()),
            self.guest_voice.clone().unwrap_or_else(|| episode.voices.guest.clone()),
        );
        for role in [Role::Host, Role::Guest] {
            if voices.get(role).trim().is_empty() {
                anyhow::bail!("No voice bound to the {} role", role);
            }
        }

        let language = self.language.clone().unwrap_or_else(|| episode.language.clone());
        if language.trim().is_empty() {
            anyhow::bail!("No language tag given for the episode");
        }

        Ok(DriverConfig {
            output_dir: self.output_dir.clone(),
            episode_name: self.name.clone().unwrap_or_else(|| episode.name.clone()),
            language,
            voices,
            default_instructions: episode.instructions.clone(),
            pauses: episode.pauses.clone(),
            speed_factor: episode.speed_factor,
            rate_policy: self.rate_policy,
            wav_format: self.wav_format,
        })
    }

    /// Options for loading the synthesis engine.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            model_dir: self.model_dir.clone(),
            provider: self.effective_provider(),
            precision: self.precision,
            num_threads: self.num_threads,
            speed: self.tts_speed,
            debug: self.verbose,
        }
    }

    /// Log the current configuration.
    pub fn log_config(&self, driver: &DriverConfig) {
        info!("Configuration:");
        info!("  Model directory: {}", self.model_dir.display());
        info!("  Provider: {} ({} threads)", self.effective_provider(), self.num_threads);
        info!("  Precision: {:?}", self.precision);
        info!("  TTS speed: {}", self.tts_speed);
        info!("  Language: {}", driver.language);
        info!("  Host voice: {}", driver.voices.host);
        info!("  Guest voice: {}", driver.voices.guest);
        if let Some(factor) = driver.speed_factor {
            info!("  Speed factor: {}", factor);
        }
        if driver.pauses.host.is_some() || driver.pauses.guest.is_some() {
            info!("  Pauses: host={:?}s guest={:?}s", driver.pauses.host, driver.pauses.guest);
        }
        info!("  Rate policy: {:?}", driver.rate_policy);
        info!("  Output: {}", driver.output_path().display());
    }
}

/// Get the default model directory (~/.podcast-tts/models).
fn default_model_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".podcast-tts").join("models")
    } else {
        PathBuf::from("models")
    }
}

/// Auto-detect the hardware acceleration provider.
///
/// CUDA is never picked automatically: it needs a CUDA-enabled sherpa-rs build.
fn detect_provider() -> Provider {
    #[cfg(all(target_os = "macos", target_arch = "aarch64"))]
    {
        Provider::CoreMl
    }

    #[cfg(not(all(target_os = "macos", target_arch = "aarch64")))]
    {
        Provider::Cpu
    }
}

/// Parse and validate the native speed multiplier (> 0).
fn parse_tts_speed(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("TTS speed must be positive, got {}", value))
    }
}
