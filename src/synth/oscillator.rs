//! Oscillators
//!
//! Sine-based tone primitives. Swept tones integrate their phase sample by
//! sample so a changing frequency never produces discontinuities.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Frequency trajectory of a tone over a burst of length `L` seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pitch {
    /// Constant frequency
    Fixed(f32),
    /// `center + depth_hz * sin(2π * rate_hz * t)`
    Wobble {
        center: f32,
        depth_hz: f32,
        rate_hz: f32,
    },
    /// `base + rise * sin(π * t / L)`: up then back down
    Arch { base: f32, rise: f32 },
    /// `start + (end - start) * (t / L)^curve`
    Glide { start: f32, end: f32, curve: f32 },
}

impl Pitch {
    /// Instantaneous frequency in Hz at `t` seconds into a burst of `length` seconds
    pub fn at(&self, t: f64, length: f64) -> f64 {
        match *self {
            Pitch::Fixed(f) => f as f64,
            Pitch::Wobble {
                center,
                depth_hz,
                rate_hz,
            } => center as f64 + depth_hz as f64 * (2.0 * PI * rate_hz as f64 * t).sin(),
            Pitch::Arch { base, rise } => {
                let progress = if length > 0.0 { t / length } else { 0.0 };
                base as f64 + rise as f64 * (PI * progress).sin()
            }
            Pitch::Glide { start, end, curve } => {
                let progress = if length > 0.0 { (t / length).clamp(0.0, 1.0) } else { 0.0 };
                start as f64 + (end as f64 - start as f64) * progress.powf(curve as f64)
            }
        }
    }
}

/// One component of a harmonic or inharmonic tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Partial {
    /// Frequency multiple of the fundamental
    pub ratio: f32,
    /// Linear amplitude
    pub amplitude: f32,
}

impl Partial {
    pub const fn new(ratio: f32, amplitude: f32) -> Self {
        Self { ratio, amplitude }
    }
}

/// A sine voice at an absolute frequency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sine {
    pub frequency: f32,
    pub amplitude: f32,
}

impl Sine {
    pub const fn new(frequency: f32, amplitude: f32) -> Self {
        Self {
            frequency,
            amplitude,
        }
    }
}

/// Slow amplitude modulator: `offset + depth * sin(2π * rate_hz * t)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lfo {
    pub offset: f32,
    pub depth: f32,
    pub rate_hz: f32,
}

impl Lfo {
    pub const fn new(offset: f32, depth: f32, rate_hz: f32) -> Self {
        Self {
            offset,
            depth,
            rate_hz,
        }
    }

    #[inline]
    pub fn value(&self, t: f64) -> f32 {
        (self.offset as f64 + self.depth as f64 * (2.0 * PI * self.rate_hz as f64 * t).sin())
            as f32
    }
}

/// Render `num_samples` of a single sine following `pitch`
pub fn tone(num_samples: usize, sample_rate: u32, amplitude: f32, pitch: Pitch) -> Vec<f32> {
    let sr = sample_rate as f64;
    let length = num_samples as f64 / sr;
    let amp = amplitude as f64;

    if let Pitch::Fixed(f) = pitch {
        let step = 2.0 * PI * f as f64 / sr;
        return (0..num_samples)
            .map(|i| (amp * (step * i as f64).sin()) as f32)
            .collect();
    }

    let mut phase = 0.0_f64;
    let mut out = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        out.push((amp * phase.sin()) as f32);
        let t = i as f64 / sr;
        phase += 2.0 * PI * pitch.at(t, length) / sr;
        if phase > 2.0 * PI {
            phase -= 2.0 * PI;
        }
    }
    out
}

/// Render a sum of fixed-frequency partials over `fundamental`
pub fn partials(
    num_samples: usize,
    sample_rate: u32,
    fundamental: f32,
    partials: &[Partial],
) -> Vec<f32> {
    let sr = sample_rate as f64;
    let steps: Vec<(f64, f64)> = partials
        .iter()
        .map(|p| {
            (
                2.0 * PI * fundamental as f64 * p.ratio as f64 / sr,
                p.amplitude as f64,
            )
        })
        .collect();

    (0..num_samples)
        .map(|i| {
            let n = i as f64;
            steps
                .iter()
                .map(|(step, amp)| amp * (step * n).sin())
                .sum::<f64>() as f32
        })
        .collect()
}

/// Render a sum of sine voices at absolute frequencies
pub fn sines(num_samples: usize, sample_rate: u32, voices: &[Sine]) -> Vec<f32> {
    let as_partials: Vec<Partial> = voices
        .iter()
        .map(|v| Partial::new(v.frequency, v.amplitude))
        .collect();
    partials(num_samples, sample_rate, 1.0, &as_partials)
}

/// Bell partial series: ratios with amplitude 1/(i+1)
pub fn bell_partials(ratios: &[f32]) -> Vec<Partial> {
    ratios
        .iter()
        .enumerate()
        .map(|(i, &ratio)| Partial::new(ratio, 1.0 / (i as f32 + 1.0)))
        .collect()
}

/// Multiply samples by an LFO, with `t` measured from the start of the slice
/// plus `offset_secs`
pub fn modulate(samples: &mut [f32], sample_rate: u32, lfo: Lfo, offset_secs: f64) {
    let sr = sample_rate as f64;
    for (i, sample) in samples.iter_mut().enumerate() {
        *sample *= lfo.value(offset_secs + i as f64 / sr);
    }
}
