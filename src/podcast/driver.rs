//! Segment-wise synthesis and episode assembly.

use std::ops::Range;
use std::path::PathBuf;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::audio::{self, Waveform, resampler};
use crate::config::{RatePolicy, WavFormat};
use crate::script::{RoleMap, Segment, VoiceBinding};
use crate::tts::{EngineError, SpeechEngine, SynthesisRequest};

/// Per-run settings for the driver.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub output_dir: PathBuf,                           // Directory the episode is written to
    pub episode_name: String,                          // Output file stem
    pub language: String,                              // Language tag for every segment
    pub voices: VoiceBinding,                          // Role -> voice name
    pub default_instructions: RoleMap<Option<String>>, // Used when a segment has no instruction
    pub pauses: RoleMap<Option<f64>>,                  // Trailing silence per role, seconds
    pub speed_factor: Option<f64>,                     // Nearest-index speed factor
    pub rate_policy: RatePolicy,                       // Mixed sample rate handling
    pub wav_format: WavFormat,                         // Output sample encoding
}

impl DriverConfig {
    /// Path of the episode file: `<output_dir>/<episode_name>.wav`.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.wav", self.episode_name))
    }
}

/// Errors that abort an episode run.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("script has no segments")]
    EmptyScript,

    #[error("segment {index} failed to synthesize")]
    Synthesis {
        index: usize,
        #[source]
        source: EngineError,
    },

    #[error("segment {index} came back at {found} Hz, episode rate is {expected} Hz")]
    SampleRateMismatch { index: usize, expected: u32, found: u32 },

    #[error("failed to resample segment {index}")]
    Resample {
        index: usize,
        #[source]
        source: anyhow::Error,
    },

    #[error("run cancelled before segment {index}")]
    Cancelled { index: usize },

    #[error("failed to create output directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// The assembled episode and where each segment landed in it.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub waveform: Waveform,
    /// Sample range of each segment, in script order
    pub spans: Vec<Range<usize>>,
}

/// Drives one engine through a script and writes the episode.
pub struct PodcastDriver<E: SpeechEngine> {
    engine: E,
    config: DriverConfig,
}

impl<E: SpeechEngine> PodcastDriver<E> {
    /// Create a driver around a loaded engine.
    pub fn new(engine: E, config: DriverConfig) -> Self {
        Self { engine, config }
    }

    /// Synthesize one segment and apply its post-processing.
    ///
    /// The speaker always comes from the voice binding for the segment's role.
    /// A segment without an instruction falls back to the role default, and to
    /// no instruction at all when that is unset too.
    pub fn synthesize_segment(&mut self, index: usize, segment: &Segment) -> Result<Waveform, DriverError> {
        let speaker = self.config.voices.get(segment.role);
        let instruction = segment.instruction.as_deref().or(self.config.default_instructions.get(segment.role).as_deref());

        let request = SynthesisRequest { text: &segment.text, language: &self.config.language, speaker, instruction };
        let mut waveform = self.engine.synthesize(&request).map_err(|source| DriverError::Synthesis { index, source })?;

        if let Some(factor) = self.config.speed_factor {
            waveform = waveform.speed_up(factor);
        }

        if let Some(seconds) = *self.config.pauses.get(segment.role) {
            waveform.append_silence(seconds);
        }

        Ok(waveform)
    }

    /// Synthesize every segment in order and concatenate the results.
    ///
    /// The episode takes the sample rate of the first segment. Later segments at a
    /// different rate are resampled or rejected according to the rate policy.
    /// The token is checked before each segment; an engine call in progress runs
    /// to completion.
    pub fn render(&mut self, segments: &[Segment], cancel: &CancellationToken) -> Result<Rendering, DriverError> {
        let total = segments.len();
        let mut output: Option<Waveform> = None;
        let mut spans = Vec::with_capacity(total);

        for (index, segment) in segments.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(DriverError::Cancelled { index });
            }

            info!("🎙️  Segment {}/{} ({})", index + 1, total, segment.role);
            let mut waveform = self.synthesize_segment(index, segment)?;
            debug!("Segment {} produced {} samples at {} Hz ({:.2}s)", index + 1, waveform.len(), waveform.sample_rate, waveform.duration());

            let episode = output.get_or_insert_with(|| Waveform::empty(waveform.sample_rate));

            if waveform.sample_rate != episode.sample_rate {
                let (expected, found) = (episode.sample_rate, waveform.sample_rate);
                match self.config.rate_policy {
                    RatePolicy::Strict => return Err(DriverError::SampleRateMismatch { index, expected, found }),
                    RatePolicy::Resample => {
                        warn!("Segment {} came back at {} Hz, resampling to {} Hz", index + 1, found, expected);
                        let samples = resampler::resample(&waveform.samples, found, expected).map_err(|source| DriverError::Resample { index, source })?;
                        waveform = Waveform::new(samples, expected);
                    }
                }
            }

            let start = episode.len();
            episode.append(&waveform);
            spans.push(start..episode.len());
        }

        let waveform = output.ok_or(DriverError::EmptyScript)?;
        Ok(Rendering { waveform, spans })
    }

    /// Render the script and write it as one WAV file.
    ///
    /// An empty script is an error: nothing is synthesized and no file is created.
    /// The output directory is created if needed and the file is written only
    /// after every segment has been assembled.
    ///
    /// # Returns
    /// Path of the written episode.
    pub fn run(&mut self, segments: &[Segment], cancel: &CancellationToken) -> Result<PathBuf, DriverError> {
        if segments.is_empty() {
            return Err(DriverError::EmptyScript);
        }

        let rendering = self.render(segments, cancel)?;
        info!(
            "Assembled {} segments: {} samples at {} Hz ({:.1}s)",
            rendering.spans.len(),
            rendering.waveform.len(),
            rendering.waveform.sample_rate,
            rendering.waveform.duration()
        );

        let dir = &self.config.output_dir;
        std::fs::create_dir_all(dir).map_err(|source| DriverError::CreateDir { path: dir.clone(), source })?;

        let path = self.config.output_path();
        audio::save_wav(&path, &rendering.waveform, self.config.wav_format).map_err(|source| DriverError::Write { path: path.clone(), source })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::Role;
    use hound::WavReader;

    /// A call seen by the recording engine.
    #[derive(Debug, Clone, PartialEq)]
    struct Call {
        text: String,
        language: String,
        speaker: String,
        instruction: Option<String>,
    }

    /// Engine that records calls and replays scripted waveforms.
    struct RecordingEngine {
        calls: Vec<Call>,
        outputs: Vec<Result<Waveform, EngineError>>,
    }

    impl RecordingEngine {
        fn new(outputs: Vec<Result<Waveform, EngineError>>) -> Self {
            Self { calls: Vec::new(), outputs }
        }

        fn with_waveforms(waveforms: Vec<Waveform>) -> Self {
            Self::new(waveforms.into_iter().map(Ok).collect())
        }
    }

    impl SpeechEngine for RecordingEngine {
        fn synthesize(&mut self, request: &SynthesisRequest<'_>) -> Result<Waveform, EngineError> {
            self.calls.push(Call {
                text: request.text.to_string(),
                language: request.language.to_string(),
                speaker: request.speaker.to_string(),
                instruction: request.instruction.map(str::to_string),
            });
            assert!(!self.outputs.is_empty(), "engine called more times than scripted");
            self.outputs.remove(0)
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("podcast-tts-driver-{}-{}", std::process::id(), name))
    }

    fn config(output_dir: PathBuf) -> DriverConfig {
        DriverConfig {
            output_dir,
            episode_name: "episode".to_string(),
            language: "English".to_string(),
            voices: RoleMap::new("A".to_string(), "B".to_string()),
            default_instructions: RoleMap::default(),
            pauses: RoleMap::default(),
            speed_factor: None,
            rate_policy: RatePolicy::Resample,
            wav_format: WavFormat::Float32,
        }
    }

    fn read_f32(path: &std::path::Path) -> (u32, Vec<f32>) {
        let reader = WavReader::open(path).unwrap();
        let rate = reader.spec().sample_rate;
        (rate, reader.into_samples::<f32>().map(|s| s.unwrap()).collect())
    }

    #[test]
    fn test_two_segment_scenario() {
        let dir = temp_dir("scenario");
        let first = Waveform::new(vec![0.1, 0.2, 0.3], 24000);
        let second = Waveform::new(vec![-0.4, -0.5], 24000);
        let engine = RecordingEngine::with_waveforms(vec![first.clone(), second.clone()]);
        let mut driver = PodcastDriver::new(engine, config(dir.clone()));

        let script = vec![Segment::new(Role::Host, "Hi", Some("cheerful")), Segment::new(Role::Guest, "Hello", None)];
        let path = driver.run(&script, &CancellationToken::new()).unwrap();

        assert_eq!(
            driver.engine.calls,
            vec![
                Call { text: "Hi".into(), language: "English".into(), speaker: "A".into(), instruction: Some("cheerful".into()) },
                Call { text: "Hello".into(), language: "English".into(), speaker: "B".into(), instruction: None },
            ]
        );

        assert_eq!(path, dir.join("episode.wav"));
        let (rate, samples) = read_f32(&path);
        assert_eq!(rate, 24000);
        let expected: Vec<f32> = first.samples.iter().chain(second.samples.iter()).copied().collect();
        assert_eq!(samples, expected);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_empty_script_is_an_error() {
        let dir = temp_dir("empty");
        let mut driver = PodcastDriver::new(RecordingEngine::new(Vec::new()), config(dir.clone()));

        let err = driver.run(&[], &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, DriverError::EmptyScript));
        assert!(driver.engine.calls.is_empty());
        assert!(!dir.exists());
    }

    #[test]
    fn test_order_preserved_in_spans() {
        let lengths = [5usize, 1, 7, 3];
        let waveforms = lengths.iter().enumerate().map(|(i, &n)| Waveform::new(vec![i as f32; n], 16000)).collect();
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), config(temp_dir("unused")));

        let script: Vec<Segment> =
            (0..lengths.len()).map(|i| Segment::new(if i % 2 == 0 { Role::Host } else { Role::Guest }, format!("line {}", i), None)).collect();
        let rendering = driver.render(&script, &CancellationToken::new()).unwrap();

        assert_eq!(rendering.spans, vec![0..5, 5..6, 6..13, 13..16]);
        for (i, span) in rendering.spans.iter().enumerate() {
            assert!(rendering.waveform.samples[span.clone()].iter().all(|&s| s == i as f32));
        }
        let texts: Vec<_> = driver.engine.calls.iter().map(|c| c.text.clone()).collect();
        assert_eq!(texts, vec!["line 0", "line 1", "line 2", "line 3"]);
    }

    #[test]
    fn test_speaker_resolution_per_role() {
        let waveforms = (0..4).map(|_| Waveform::new(vec![0.0], 24000)).collect();
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), config(temp_dir("unused")));

        let script = vec![
            Segment::new(Role::Guest, "one", None),
            Segment::new(Role::Guest, "two", None),
            Segment::new(Role::Host, "three", None),
            Segment::new(Role::Guest, "four", None),
        ];
        driver.render(&script, &CancellationToken::new()).unwrap();

        let speakers: Vec<_> = driver.engine.calls.iter().map(|c| c.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["B", "B", "A", "B"]);
    }

    #[test]
    fn test_role_default_instruction_only_when_configured() {
        let waveforms = (0..3).map(|_| Waveform::new(vec![0.0], 24000)).collect();
        let mut cfg = config(temp_dir("unused"));
        cfg.default_instructions = RoleMap::new(None, Some("Speak calmly.".to_string()));
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), cfg);

        let script = vec![
            Segment::new(Role::Host, "no default", None),
            Segment::new(Role::Guest, "role default", None),
            Segment::new(Role::Guest, "own instruction", Some("Whisper.")),
        ];
        driver.render(&script, &CancellationToken::new()).unwrap();

        let instructions: Vec<_> = driver.engine.calls.iter().map(|c| c.instruction.clone()).collect();
        assert_eq!(instructions, vec![None, Some("Speak calmly.".to_string()), Some("Whisper.".to_string())]);
    }

    #[test]
    fn test_pauses_and_speed_per_segment() {
        let waveforms = vec![Waveform::new(vec![1.0; 10], 1000), Waveform::new(vec![1.0; 10], 1000)];
        let mut cfg = config(temp_dir("unused"));
        cfg.pauses = RoleMap::new(Some(0.002), Some(0.005));
        cfg.speed_factor = Some(2.0);
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), cfg);

        let script = vec![Segment::new(Role::Host, "a", None), Segment::new(Role::Guest, "b", None)];
        let rendering = driver.render(&script, &CancellationToken::new()).unwrap();

        // 10 samples at 2x -> 5, then 2 (host) or 5 (guest) samples of silence
        assert_eq!(rendering.spans, vec![0..7, 7..17]);
        let samples = &rendering.waveform.samples;
        assert!(samples[0..5].iter().all(|&s| s == 1.0));
        assert!(samples[5..7].iter().all(|&s| s == 0.0));
        assert!(samples[7..12].iter().all(|&s| s == 1.0));
        assert!(samples[12..17].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_engine_failure_aborts_without_output() {
        let dir = temp_dir("failure");
        let engine = RecordingEngine::new(vec![Ok(Waveform::new(vec![0.1], 24000)), Err(EngineError::UnknownSpeaker("B".to_string()))]);
        let mut driver = PodcastDriver::new(engine, config(dir.clone()));

        let script = vec![Segment::new(Role::Host, "Hi", None), Segment::new(Role::Guest, "Hello", None), Segment::new(Role::Host, "Bye", None)];
        let err = driver.run(&script, &CancellationToken::new()).unwrap_err();

        assert!(matches!(err, DriverError::Synthesis { index: 1, source: EngineError::UnknownSpeaker(_) }));
        assert_eq!(driver.engine.calls.len(), 2);
        assert!(!dir.join("episode.wav").exists());
    }

    #[test]
    fn test_strict_rate_policy_rejects_mismatch() {
        let waveforms = vec![Waveform::new(vec![0.0; 10], 24000), Waveform::new(vec![0.0; 10], 22050)];
        let mut cfg = config(temp_dir("unused"));
        cfg.rate_policy = RatePolicy::Strict;
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), cfg);

        let script = vec![Segment::new(Role::Host, "a", None), Segment::new(Role::Guest, "b", None)];
        let err = driver.render(&script, &CancellationToken::new()).unwrap_err();
        assert!(matches!(err, DriverError::SampleRateMismatch { index: 1, expected: 24000, found: 22050 }));
    }

    #[test]
    fn test_resample_rate_policy_uses_first_rate() {
        let waveforms = vec![Waveform::new(vec![0.0; 100], 24000), Waveform::new(vec![0.0; 8000], 16000)];
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(waveforms), config(temp_dir("unused")));

        let script = vec![Segment::new(Role::Host, "a", None), Segment::new(Role::Guest, "b", None)];
        let rendering = driver.render(&script, &CancellationToken::new()).unwrap();

        assert_eq!(rendering.waveform.sample_rate, 24000);
        assert_eq!(rendering.spans, vec![0..100, 100..12100]);
    }

    #[test]
    fn test_cancellation_stops_before_next_segment() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut driver = PodcastDriver::new(RecordingEngine::new(Vec::new()), config(temp_dir("unused")));

        let err = driver.render(&[Segment::new(Role::Host, "a", None)], &cancel).unwrap_err();
        assert!(matches!(err, DriverError::Cancelled { index: 0 }));
        assert!(driver.engine.calls.is_empty());
    }

    #[test]
    fn test_creates_missing_output_directory() {
        let dir = temp_dir("nested").join("a").join("b");
        let mut driver = PodcastDriver::new(RecordingEngine::with_waveforms(vec![Waveform::new(vec![0.5], 8000)]), config(dir.clone()));

        let path = driver.run(&[Segment::new(Role::Host, "a", None)], &CancellationToken::new()).unwrap();
        assert!(path.exists());
        let (rate, samples) = read_f32(&path);
        assert_eq!((rate, samples), (8000, vec![0.5]));

        std::fs::remove_dir_all(temp_dir("nested")).ok();
    }
}
