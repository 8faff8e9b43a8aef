//! Mixer
//!
//! Combines the four layers into one soundtrack:
//! 1. High-pass the non-bass layers so only the bass owns the low end
//! 2. Weighted sum (f64 accumulation)
//! 3. Static compression
//! 4. Optional fades, then the output stage (clip or normalize)
//!
//! Layers must agree on sample rate and length. Mismatches are rejected,
//! never padded or truncated.

use std::collections::BTreeSet;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::dsp::{apply_fades, Biquad, CompressorParams, FilterType, OutputStage, StaticCompressor};
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};
use crate::layers::{Layer, LayerKind};

/// Fixed gain per layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixWeights {
    pub bass: f32,
    pub melody: f32,
    pub atmosphere: f32,
    pub effects: f32,
}

impl Default for MixWeights {
    fn default() -> Self {
        Self {
            bass: 1.00,
            melody: 0.06,
            atmosphere: 0.07,
            effects: 0.08,
        }
    }
}

impl MixWeights {
    pub fn weight(&self, kind: LayerKind) -> f32 {
        match kind {
            LayerKind::Bass => self.bass,
            LayerKind::Melody => self.melody,
            LayerKind::Atmosphere => self.atmosphere,
            LayerKind::Effects => self.effects,
        }
    }

    fn validate(&self) -> Result<()> {
        for kind in LayerKind::ALL {
            let weight = self.weight(kind);
            if !weight.is_finite() || weight < 0.0 {
                return Err(DirgeError::InvalidParameter {
                    param: format!("mixer.weights.{}", kind),
                    value: weight.to_string(),
                    expected: "a finite, non-negative gain".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// High-pass applied to the upper layers before summing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighPassConfig {
    pub cutoff_hz: f32,
    pub q: f32,
    pub layers: Vec<LayerKind>,
}

impl Default for HighPassConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 300.0,
            q: 0.707,
            layers: vec![LayerKind::Melody, LayerKind::Atmosphere, LayerKind::Effects],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MixerConfig {
    pub weights: MixWeights,
    pub highpass: HighPassConfig,
    pub compression: CompressorParams,
    /// Fade-in and fade-out length in seconds; 0 disables fades
    pub fade_secs: f32,
    pub output_stage: OutputStage,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            weights: MixWeights::default(),
            highpass: HighPassConfig::default(),
            compression: CompressorParams::default(),
            fade_secs: 0.0,
            output_stage: OutputStage::Clip,
        }
    }
}

impl MixerConfig {
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if !(self.highpass.cutoff_hz > 0.0 && self.highpass.cutoff_hz.is_finite()) {
            return Err(DirgeError::InvalidParameter {
                param: "mixer.highpass.cutoff_hz".to_string(),
                value: self.highpass.cutoff_hz.to_string(),
                expected: "a positive frequency".to_string(),
            });
        }
        if !(self.fade_secs >= 0.0 && self.fade_secs.is_finite()) {
            return Err(DirgeError::InvalidParameter {
                param: "mixer.fade_secs".to_string(),
                value: self.fade_secs.to_string(),
                expected: ">= 0".to_string(),
            });
        }
        self.compression.validate()?;
        self.output_stage.validate()?;
        Ok(())
    }
}

pub struct Mixer {
    config: MixerConfig,
    compressor: StaticCompressor,
}

impl Mixer {
    pub fn new(config: MixerConfig) -> Result<Self> {
        config.validate()?;
        let compressor = StaticCompressor::new(config.compression)?;
        Ok(Self { config, compressor })
    }

    pub fn config(&self) -> &MixerConfig {
        &self.config
    }

    /// Mix `layers` into a single buffer bounded to [-1, 1]
    ///
    /// The result has the layers' length and sample rate. The order of
    /// `layers` does not matter.
    pub fn mix(&self, layers: &[Layer]) -> Result<AudioBuffer> {
        let (sample_rate, len) = check_layers(layers)?;

        let mut acc = vec![0.0_f64; len];
        for layer in layers {
            let weight = self.config.weights.weight(layer.kind) as f64;
            if self.config.highpass.layers.contains(&layer.kind) {
                let mut filtered = layer.buffer.samples().to_vec();
                Biquad::new(
                    FilterType::HighPass,
                    sample_rate,
                    self.config.highpass.cutoff_hz,
                    self.config.highpass.q,
                )
                .process_slice(&mut filtered);
                accumulate(&mut acc, &filtered, weight);
            } else {
                accumulate(&mut acc, layer.buffer.samples(), weight);
            }
        }

        // Huge weights must saturate, not overflow to infinity
        let mut samples: Vec<f32> = acc
            .into_iter()
            .map(|s| s.clamp(f32::MIN as f64, f32::MAX as f64) as f32)
            .collect();
        let compressed = self.compressor.process_slice(&mut samples);
        let mut mixed = AudioBuffer::new(samples, sample_rate);

        if self.config.fade_secs > 0.0 {
            apply_fades(&mut mixed, self.config.fade_secs);
        }
        self.config.output_stage.apply(&mut mixed);

        debug!(
            "Mixed {} layers: {} samples, {} compressed, peak {:.3}, rms {:.3}",
            layers.len(),
            mixed.len(),
            compressed,
            mixed.peak(),
            mixed.rms()
        );
        Ok(mixed)
    }
}

/// Shared sample rate and length of a valid layer set
fn check_layers(layers: &[Layer]) -> Result<(u32, usize)> {
    let first = layers.first().ok_or(DirgeError::EmptyMix)?;
    let sample_rate = first.buffer.sample_rate();
    let len = first.buffer.len();

    let mut seen = BTreeSet::new();
    for layer in layers {
        if !seen.insert(layer.kind) {
            return Err(DirgeError::DuplicateLayer {
                layer: layer.kind.to_string(),
            });
        }
        if layer.buffer.sample_rate() != sample_rate {
            return Err(DirgeError::SampleRateMismatch {
                expected: sample_rate,
                actual: layer.buffer.sample_rate(),
            });
        }
        if layer.buffer.len() != len {
            return Err(DirgeError::LengthMismatch {
                layer: layer.kind.to_string(),
                expected: len,
                actual: layer.buffer.len(),
            });
        }
    }
    Ok((sample_rate, len))
}

fn accumulate(acc: &mut [f64], samples: &[f32], weight: f64) {
    for (dst, &src) in acc.iter_mut().zip(samples) {
        *dst += src as f64 * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::buffer::rms;

    fn sine_layer(kind: LayerKind, freq: f32, amplitude: f32) -> Layer {
        Layer::new(kind, AudioBuffer::sine(freq, amplitude, 1.0, 8000))
    }

    #[test]
    fn test_output_bounded_for_huge_layers() {
        let mixer = Mixer::new(MixerConfig::default()).unwrap();
        let layers: Vec<Layer> = LayerKind::ALL
            .into_iter()
            .map(|kind| sine_layer(kind, 440.0, 50.0))
            .collect();
        let mixed = mixer.mix(&layers).unwrap();
        assert_eq!(mixed.len(), 8000);
        assert!(mixed.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_order_independent() {
        let mixer = Mixer::new(MixerConfig::default()).unwrap();
        let layers = vec![
            sine_layer(LayerKind::Bass, 40.0, 0.8),
            sine_layer(LayerKind::Melody, 523.0, 0.7),
            sine_layer(LayerKind::Atmosphere, 880.0, 0.6),
            sine_layer(LayerKind::Effects, 2000.0, 0.9),
        ];
        let forward = mixer.mix(&layers).unwrap();
        let reversed: Vec<Layer> = layers.iter().rev().cloned().collect();
        let backward = mixer.mix(&reversed).unwrap();
        for (a, b) in forward.samples().iter().zip(backward.samples()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rejects_mismatched_layers() {
        let mixer = Mixer::new(MixerConfig::default()).unwrap();
        assert!(matches!(mixer.mix(&[]), Err(DirgeError::EmptyMix)));

        let short = Layer::new(LayerKind::Melody, AudioBuffer::sine(440.0, 0.5, 0.5, 8000));
        let err = mixer
            .mix(&[sine_layer(LayerKind::Bass, 40.0, 0.5), short])
            .unwrap_err();
        assert!(matches!(
            err,
            DirgeError::LengthMismatch {
                expected: 8000,
                actual: 4000,
                ..
            }
        ));

        let other_rate = Layer::new(LayerKind::Melody, AudioBuffer::sine(440.0, 0.5, 1.0, 16000));
        assert!(matches!(
            mixer.mix(&[sine_layer(LayerKind::Bass, 40.0, 0.5), other_rate]),
            Err(DirgeError::SampleRateMismatch { .. })
        ));

        assert!(matches!(
            mixer.mix(&[
                sine_layer(LayerKind::Bass, 40.0, 0.5),
                sine_layer(LayerKind::Bass, 50.0, 0.5)
            ]),
            Err(DirgeError::DuplicateLayer { .. })
        ));
    }

    #[test]
    fn test_bass_bypasses_high_pass() {
        let mixer = Mixer::new(MixerConfig::default()).unwrap();
        let mixed = mixer.mix(&[sine_layer(LayerKind::Bass, 55.0, 0.25)]).unwrap();
        // Below the compression threshold: bass passes untouched
        assert!((rms(mixed.samples()) - 0.25 / 2f32.sqrt()).abs() < 1e-3);
    }

    #[test]
    fn test_high_pass_removes_low_melody() {
        let config = MixerConfig {
            weights: MixWeights {
                melody: 1.0,
                ..MixWeights::default()
            },
            ..MixerConfig::default()
        };
        let mixer = Mixer::new(config).unwrap();
        let low = mixer.mix(&[sine_layer(LayerKind::Melody, 55.0, 0.25)]).unwrap();
        let high = mixer.mix(&[sine_layer(LayerKind::Melody, 2000.0, 0.25)]).unwrap();
        // Skip the filter's settling time
        let low_rms = rms(&low.samples()[800..]);
        let high_rms = rms(&high.samples()[800..]);
        assert!(low_rms < 0.1 * high_rms, "low {} high {}", low_rms, high_rms);
    }

    #[test]
    fn test_compression_above_threshold() {
        let config = MixerConfig {
            output_stage: OutputStage::Clip,
            ..MixerConfig::default()
        };
        let mixer = Mixer::new(config).unwrap();
        let loud = Layer::new(LayerKind::Bass, AudioBuffer::new(vec![0.9, -0.9, 0.2], 8000));
        let mixed = mixer.mix(&[loud]).unwrap();
        assert!((mixed.samples()[0] - 0.5).abs() < 1e-6);
        assert!((mixed.samples()[1] + 0.5).abs() < 1e-6);
        assert!((mixed.samples()[2] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_output_stage() {
        let config = MixerConfig {
            output_stage: OutputStage::Normalize { peak: 0.9 },
            ..MixerConfig::default()
        };
        let mixer = Mixer::new(config).unwrap();
        let mixed = mixer.mix(&[sine_layer(LayerKind::Bass, 55.0, 0.2)]).unwrap();
        assert!((mixed.peak() - 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_survives_overflowing_weights() {
        let config = MixerConfig {
            weights: MixWeights {
                bass: 1e38,
                ..MixWeights::default()
            },
            output_stage: OutputStage::Normalize { peak: 0.9 },
            ..MixerConfig::default()
        };
        let mixer = Mixer::new(config).unwrap();
        let mixed = mixer.mix(&[sine_layer(LayerKind::Bass, 55.0, 10.0)]).unwrap();
        assert!(mixed.is_finite());
        assert!(mixed.samples().iter().all(|s| (-1.0..=1.0).contains(s)));
        assert!((mixed.peak() - 0.9).abs() < 1e-3, "peak {}", mixed.peak());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MixerConfig {
            compression: CompressorParams {
                threshold: 0.0,
                ratio: 3.0,
            },
            ..MixerConfig::default()
        };
        assert!(Mixer::new(config).is_err());

        let config = MixerConfig {
            weights: MixWeights {
                effects: -1.0,
                ..MixWeights::default()
            },
            ..MixerConfig::default()
        };
        assert!(Mixer::new(config).is_err());
    }
}
