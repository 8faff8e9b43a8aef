//! Layer Generators
//!
//! Four independent generators, each a pure function of a `RenderSpec` and
//! its own parameter struct:
//! - Bass: sub-bass drones, rumble, thunder and a heartbeat
//! - Melody: church bells, music box and theremin
//! - Atmosphere: ghostly choir, dark pad and high shimmer
//! - Effects: wind, creaks, bats, footsteps, chains, howl and crash
//!
//! No generator reads another's output.

mod atmosphere;
mod bass;
mod effects;
mod melody;

pub use atmosphere::{AtmosphereGenerator, AtmosphereParams, Chord, Shimmer};
pub use bass::{BassGenerator, BassParams, Heartbeat, Thunder};
pub use effects::{
    Bats, Chains, Crash, Creaks, EffectsGenerator, EffectsParams, Footsteps, Howl, Wind, WindBand,
};
pub use melody::{Bells, MelodyGenerator, MelodyParams, MusicBox, Note, Span, Theremin};

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::RenderSpec;
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};
use crate::synth::{modulate, sines, Lfo, Sine};

/// Identity of a layer in the mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Bass,
    Melody,
    Atmosphere,
    Effects,
}

impl LayerKind {
    /// Every layer, in canonical mix order
    pub const ALL: [LayerKind; 4] = [
        LayerKind::Bass,
        LayerKind::Melody,
        LayerKind::Atmosphere,
        LayerKind::Effects,
    ];

    /// Stable lowercase name used in configs, file names and logs
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Bass => "bass",
            LayerKind::Melody => "melody",
            LayerKind::Atmosphere => "atmosphere",
            LayerKind::Effects => "effects",
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayerKind {
    type Err = DirgeError;

    fn from_str(s: &str) -> Result<Self> {
        LayerKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| DirgeError::InvalidParameter {
                param: "layer".to_string(),
                value: s.to_string(),
                expected: "bass, melody, atmosphere or effects".to_string(),
            })
    }
}

/// A named audio buffer produced by one generator
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub kind: LayerKind,
    pub buffer: AudioBuffer,
}

impl Layer {
    pub fn new(kind: LayerKind, buffer: AudioBuffer) -> Self {
        Self { kind, buffer }
    }
}

/// Common interface of the four generators
pub trait LayerGenerator {
    /// Which layer this generator produces
    fn kind(&self) -> LayerKind;

    /// Peak the rendered layer is normalized to
    fn peak(&self) -> f32;

    /// Render the raw layer for an already validated spec
    ///
    /// Must return exactly `spec.num_samples()` samples.
    fn render(&self, spec: &RenderSpec) -> AudioBuffer;

    /// Validate the spec, render, and peak-normalize the result
    fn generate(&self, spec: &RenderSpec) -> Result<Layer> {
        spec.validate()?;
        let mut buffer = self.render(spec);
        debug_assert_eq!(buffer.len(), spec.num_samples());
        buffer.normalize_peak(self.peak());
        debug!(
            "Generated {} layer: {} samples, rms {:.3}",
            self.kind(),
            buffer.len(),
            buffer.rms()
        );
        Ok(Layer::new(self.kind(), buffer))
    }
}

/// A bank of steady sines under one slow amplitude LFO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    pub voices: Vec<Sine>,
    pub lfo: Lfo,
}

impl Drone {
    /// Render the drone over `num_samples`, starting at t = 0
    pub fn render(&self, num_samples: usize, sample_rate: u32) -> Vec<f32> {
        let mut out = sines(num_samples, sample_rate, &self.voices);
        modulate(&mut out, sample_rate, self.lfo, 0.0);
        out
    }
}
