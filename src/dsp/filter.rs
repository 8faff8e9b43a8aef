//! Biquad filters
//!
//! Second-order high-pass and low-pass sections used by the mixer to keep
//! non-bass layers out of the low end, and by the noise generator to
//! band-limit textures.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Filter response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterType {
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
}

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (a0 + a1*z^-1 + a2*z^-2)
/// Normalized: all coefficients divided by a0
#[derive(Debug, Clone, Copy, Default)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    /// Audio EQ Cookbook pass filters
    /// Reference: https://www.w3.org/2011/audio/audio-eq-cookbook.html
    fn calculate(filter_type: FilterType, sample_rate: f64, frequency: f64, q: f64) -> Self {
        // Clamp frequency to valid range (below Nyquist)
        let freq = frequency.clamp(1.0, sample_rate / 2.0 - 1.0);
        let q = q.clamp(0.1, 10.0);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterType::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Single biquad section with its own delay line
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: BiquadCoeffs,
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl Biquad {
    /// Create a filter for the given response, sample rate, corner and Q
    pub fn new(filter_type: FilterType, sample_rate: u32, frequency: f32, q: f32) -> Self {
        Self {
            coeffs: BiquadCoeffs::calculate(
                filter_type,
                sample_rate as f64,
                frequency as f64,
                q as f64,
            ),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Butterworth-Q high-pass
    pub fn high_pass(sample_rate: u32, frequency: f32) -> Self {
        Self::new(FilterType::HighPass, sample_rate, frequency, std::f32::consts::FRAC_1_SQRT_2)
    }

    /// Butterworth-Q low-pass
    pub fn low_pass(sample_rate: u32, frequency: f32) -> Self {
        Self::new(FilterType::LowPass, sample_rate, frequency, std::f32::consts::FRAC_1_SQRT_2)
    }

    /// Process a single sample (Direct Form I)
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let x = input as f64;
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y as f32
    }

    /// Filter a whole slice in place
    pub fn process_slice(&mut self, samples: &mut [f32]) {
        for sample in samples.iter_mut() {
            *sample = self.process(*sample);
        }
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AudioBuffer;

    fn filtered_gain(filter: &mut Biquad, frequency: f32) -> f32 {
        let mut buffer = AudioBuffer::sine(frequency, 1.0, 0.5, 44100);
        let before = buffer.rms();
        filter.reset();
        filter.process_slice(buffer.samples_mut());
        // Skip the transient at the start
        let settled = &buffer.samples()[4410..];
        crate::engine::buffer::rms(settled) / before
    }

    #[test]
    fn test_high_pass_filter() {
        let mut hp = Biquad::high_pass(44100, 300.0);

        let low_gain = filtered_gain(&mut hp, 55.0);
        assert!(low_gain < 0.1, "55 Hz should be attenuated, got {}", low_gain);

        let high_gain = filtered_gain(&mut hp, 2000.0);
        assert!(
            high_gain > 0.9 && high_gain < 1.1,
            "2 kHz should pass, got {}",
            high_gain
        );
    }

    #[test]
    fn test_low_pass_filter() {
        let mut lp = Biquad::low_pass(44100, 500.0);

        let low_gain = filtered_gain(&mut lp, 100.0);
        assert!(low_gain > 0.9, "100 Hz should pass, got {}", low_gain);

        let high_gain = filtered_gain(&mut lp, 8000.0);
        assert!(high_gain < 0.05, "8 kHz should be attenuated, got {}", high_gain);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut hp = Biquad::high_pass(44100, 300.0);
        let mut first = vec![1.0_f32; 64];
        hp.process_slice(&mut first);
        hp.reset();
        let mut second = vec![1.0_f32; 64];
        hp.process_slice(&mut second);
        assert_eq!(first, second);
    }

    #[test]
    fn test_cutoff_above_nyquist_stays_stable() {
        let mut lp = Biquad::low_pass(8000, 20000.0);
        let mut buffer = AudioBuffer::sine(1000.0, 1.0, 0.1, 8000);
        lp.process_slice(buffer.samples_mut());
        assert!(buffer.is_finite());
    }
}
