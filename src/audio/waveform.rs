//! Mono waveform buffer and the per-segment post-processing steps.

/// Mono audio samples paired with their sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>, // Mono samples, nominally in [-1.0, 1.0]
    pub sample_rate: u32,  // Samples per second
}

impl Waveform {
    /// Create a waveform from raw samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    /// Create an empty waveform at the given sample rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self { samples: Vec::new(), sample_rate }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the waveform holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Append another waveform's samples. Rates must already match.
    pub fn append(&mut self, other: &Waveform) {
        debug_assert_eq!(self.sample_rate, other.sample_rate, "appending waveforms with different sample rates");
        self.samples.extend_from_slice(&other.samples);
    }

    /// Append `round(seconds * sample_rate)` zero samples.
    ///
    /// Used to leave a conversational gap after a line of dialogue.
    pub fn append_silence(&mut self, seconds: f64) {
        let count = silence_len(seconds, self.sample_rate);
        self.samples.resize(self.samples.len() + count, 0.0);
    }

    /// Crude speed change by nearest-index selection.
    ///
    /// Keeps the samples at indices `round(0), round(f), round(2f), ...` while the
    /// index stays in bounds. Ties round half to even. This is not a time-stretch:
    /// it shifts pitch along with tempo and aliases, so treat the result as lossy.
    ///
    /// # Arguments
    /// * `factor` - Speed factor, must be positive (`> 1` speeds up, `< 1` slows down)
    pub fn speed_up(&self, factor: f64) -> Waveform {
        debug_assert!(factor > 0.0 && factor.is_finite(), "speed factor must be positive");

        let len = self.samples.len();
        let mut samples = Vec::with_capacity(len);

        let mut i = 0u64;
        loop {
            let position = i as f64 * factor;
            if position >= len as f64 {
                break;
            }
            let index = position.round_ties_even() as usize;
            if index < len {
                samples.push(self.samples[index]);
            }
            i += 1;
        }

        Waveform::new(samples, self.sample_rate)
    }
}

/// Number of samples for a pause of `seconds` at `sample_rate`.
fn silence_len(seconds: f64, sample_rate: u32) -> usize {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * sample_rate as f64).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_silence_length_and_zeros() {
        let mut wave = Waveform::new(vec![0.5; 100], 24000);
        wave.append_silence(0.18);
        assert_eq!(wave.len(), 100 + 4320);
        assert!(wave.samples[100..].iter().all(|&s| s == 0.0));
        assert!(wave.samples[..100].iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_append_silence_rounds() {
        // 0.00005 s * 30000 Hz = 1.5 samples -> 2
        let mut wave = Waveform::empty(30000);
        wave.append_silence(0.00005);
        assert_eq!(wave.len(), 2);

        let mut wave = Waveform::empty(24000);
        wave.append_silence(0.0);
        assert!(wave.is_empty());
    }

    #[test]
    fn test_speed_up_factor_two() {
        let wave = Waveform::new((0..10).map(|i| i as f32).collect(), 16000);
        let fast = wave.speed_up(2.0);
        assert_eq!(fast.samples, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
        assert_eq!(fast.sample_rate, 16000);
    }

    #[test]
    fn test_speed_up_ties_round_to_even() {
        // Positions 0, 1.5, 3, 4.5 -> indices 0, 2, 3, 4
        let wave = Waveform::new((0..6).map(|i| i as f32).collect(), 8000);
        let fast = wave.speed_up(1.5);
        assert_eq!(fast.samples, vec![0.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_speed_up_shortens_for_factor_above_one() {
        let wave = Waveform::new(vec![0.1; 1000], 24000);
        let fast = wave.speed_up(1.25);
        assert_eq!(fast.len(), (1000f64 / 1.25).ceil() as usize);
        assert!(fast.len() < wave.len());
    }

    #[test]
    fn test_speed_up_slows_down_for_factor_below_one() {
        // Positions 0, 0.5, 1, 1.5, 2, 2.5 -> indices 0, 0, 1, 2, 2, 2
        let wave = Waveform::new(vec![0.0, 1.0, 2.0], 24000);
        let slow = wave.speed_up(0.5);
        assert_eq!(slow.samples, vec![0.0, 0.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_speed_up_identity() {
        let wave = Waveform::new(vec![0.1, -0.2, 0.3], 24000);
        assert_eq!(wave.speed_up(1.0), wave);
    }

    #[test]
    fn test_duration() {
        let wave = Waveform::new(vec![0.0; 48000], 24000);
        assert!((wave.duration() - 2.0).abs() < 1e-6);
    }
}
