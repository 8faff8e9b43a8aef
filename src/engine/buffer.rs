//! Audio Buffer Management
//!
//! Provides the mono audio buffer used by every stage of Dirge, plus the
//! level helpers shared by the mixer and the quality gate.

use crate::error::{DirgeError, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default render sample rate (CD quality)
pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

/// Lowest sample rate accepted anywhere in the pipeline
pub const MIN_SAMPLE_RATE: u32 = 8000;

/// Highest sample rate accepted anywhere in the pipeline
pub const MAX_SAMPLE_RATE: u32 = 192_000;

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert decibels to linear amplitude
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels
///
/// Returns -f32::INFINITY for zero input.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Calculate the linear RMS level of a slice of samples
///
/// Accumulates in f64 so long buffers do not lose precision.
/// Returns 0.0 for an empty slice.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Calculate the peak (maximum absolute value) of a slice of samples
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Sum of squared samples (window energy)
pub fn energy(samples: &[f32]) -> f64 {
    samples.iter().map(|&s| (s as f64) * (s as f64)).sum()
}

// ============================================================================
// Audio Buffer
// ============================================================================

/// Core audio buffer type for all audio processing in Dirge
///
/// A single channel of 32-bit float samples at a fixed sample rate.
/// Values are nominally within [-1.0, 1.0] but intermediate synthesis
/// results may exceed that range until the mixer's output stage.
///
/// # Example
/// ```
/// use dirge::engine::AudioBuffer;
///
/// let buffer = AudioBuffer::sine(440.0, 0.5, 1.0, 44100);
/// assert_eq!(buffer.len(), 44100);
/// assert!((buffer.peak() - 0.5).abs() < 1e-3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from existing samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Create a buffer of `num_samples` zeroed samples
    pub fn silence(num_samples: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; num_samples], sample_rate)
    }

    /// Create a pure sine tone
    ///
    /// # Arguments
    /// * `frequency` - Tone frequency in Hz
    /// * `amplitude` - Peak amplitude
    /// * `duration_secs` - Length in seconds (rounded to whole samples)
    /// * `sample_rate` - Sample rate in Hz
    pub fn sine(frequency: f32, amplitude: f32, duration_secs: f64, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f64).round() as usize;
        let step = 2.0 * std::f64::consts::PI * frequency as f64 / sample_rate as f64;
        let samples = (0..num_samples)
            .map(|i| (amplitude as f64 * (step * i as f64).sin()) as f32)
            .collect();
        Self::new(samples, sample_rate)
    }

    /// Sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Immutable view of the samples
    #[inline]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable view of the samples
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume the buffer, returning the raw samples
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Linear RMS level
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    /// Linear peak level
    pub fn peak(&self) -> f32 {
        peak(&self.samples)
    }

    /// Check that every sample is finite (no NaN/Inf)
    pub fn is_finite(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Multiply every sample by a linear gain
    pub fn apply_gain(&mut self, gain: f32) {
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }

    /// Scale the buffer so its peak equals `target`
    ///
    /// Silent buffers and buffers holding non-finite samples are left
    /// untouched.
    pub fn normalize_peak(&mut self, target: f32) {
        let current = self.peak();
        if current > 0.0 && current.is_finite() {
            let gain = target as f64 / current as f64;
            for sample in &mut self.samples {
                *sample = (*sample as f64 * gain) as f32;
            }
        }
    }

    /// Clamp all samples into [-1.0, 1.0]
    pub fn clamp(&mut self) {
        for sample in &mut self.samples {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    /// Iterate over analysis windows of `window` samples advancing by `hop`
    ///
    /// Only complete windows are yielded.
    pub fn windows(&self, window: usize, hop: usize) -> impl Iterator<Item = &[f32]> + '_ {
        let count = if window == 0 || hop == 0 || self.samples.len() < window {
            0
        } else {
            (self.samples.len() - window) / hop + 1
        };
        (0..count).map(move |i| &self.samples[i * hop..i * hop + window])
    }

    /// Fail with `EmptyBuffer` when there is nothing to process
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.samples.is_empty() {
            return Err(DirgeError::EmptyBuffer);
        }
        Ok(())
    }
}
