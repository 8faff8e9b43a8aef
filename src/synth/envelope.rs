//! Amplitude envelopes
//!
//! Multiplier curves evaluated over the lifetime of a burst.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Attack-Decay-Sustain-Release envelope with shaped attack and release
///
/// Times are in seconds. The release always ends at the end of the burst,
/// so it begins at `length - release`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    /// Sustain level (0.0 to 1.0)
    pub sustain: f32,
    pub release: f32,
    /// Exponent applied to the attack ramp (1.0 = linear)
    pub attack_curve: f32,
    /// Exponent applied to the release ramp (1.0 = linear)
    pub release_curve: f32,
}

impl Adsr {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.max(0.0),
            decay: decay.max(0.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.max(0.0),
            attack_curve: 1.0,
            release_curve: 1.0,
        }
    }

    pub fn with_curves(mut self, attack_curve: f32, release_curve: f32) -> Self {
        self.attack_curve = attack_curve.max(0.01);
        self.release_curve = release_curve.max(0.01);
        self
    }

    fn level_before_release(&self, t: f64) -> f64 {
        let attack = self.attack as f64;
        let decay = self.decay as f64;
        let sustain = self.sustain as f64;

        if t < attack {
            (t / attack).powf(self.attack_curve as f64)
        } else if t < attack + decay {
            1.0 - (1.0 - sustain) * ((t - attack) / decay)
        } else if decay > 0.0 {
            sustain
        } else {
            1.0
        }
    }

    /// Envelope gain at `t` seconds into a burst of `length` seconds
    pub fn gain(&self, t: f64, length: f64) -> f64 {
        let release = self.release as f64;
        let release_start = (length - release).max(0.0);
        if release > 0.0 && t >= release_start {
            let level = self.level_before_release(release_start);
            let remaining = (1.0 - (t - release_start) / release).clamp(0.0, 1.0);
            level * remaining.powf(self.release_curve as f64)
        } else {
            self.level_before_release(t)
        }
    }
}

/// Multiplier curve applied over a burst
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Envelope {
    Constant,
    /// `exp(-rate * t)`
    ExpDecay { rate: f32 },
    /// `sin(π t / L)^power`
    HalfSine { power: f32 },
    /// `exp(-(t - center)^2 / width)`
    Gaussian { center: f32, width: f32 },
    Adsr(Adsr),
}

impl Envelope {
    /// Gain at `t` seconds into a burst of `length` seconds
    pub fn gain(&self, t: f64, length: f64) -> f64 {
        match *self {
            Envelope::Constant => 1.0,
            Envelope::ExpDecay { rate } => (-(rate as f64) * t).exp(),
            Envelope::HalfSine { power } => {
                if length <= 0.0 {
                    return 0.0;
                }
                (PI * t / length).sin().max(0.0).powf(power as f64)
            }
            Envelope::Gaussian { center, width } => {
                let d = t - center as f64;
                (-(d * d) / (width as f64).max(f64::EPSILON)).exp()
            }
            Envelope::Adsr(adsr) => adsr.gain(t, length),
        }
    }

    /// Multiply a burst by this envelope in place
    pub fn apply(&self, samples: &mut [f32], sample_rate: u32) {
        let sr = sample_rate as f64;
        let length = samples.len() as f64 / sr;
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = (*sample as f64 * self.gain(i as f64 / sr, length)) as f32;
        }
    }
}
