//! Atmosphere layer: ghostly choir, dark pad and high shimmer

use serde::{Deserialize, Serialize};

use super::{Drone, LayerGenerator, LayerKind};
use crate::config::RenderSpec;
use crate::engine::AudioBuffer;
use crate::synth::{burst_len, mix_into, modulate, place, tone, Adsr, Envelope, Lfo, Pitch, Sine};

/// A sustained dissonant chord sung by the choir
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub start: f32,
    pub end: f32,
    pub frequencies: Vec<f32>,
}

/// High, slowly wandering sine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shimmer {
    pub pitch: Pitch,
    pub amplitude: f32,
    pub lfo: Lfo,
}

impl Default for Shimmer {
    fn default() -> Self {
        Self {
            pitch: Pitch::Wobble {
                center: 1800.0,
                depth_hz: 300.0,
                rate_hz: 0.4,
            },
            amplitude: 0.12,
            lfo: Lfo::new(0.5, 0.5, 0.3),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphereParams {
    pub chords: Vec<Chord>,
    /// Amplitude of each choir voice
    pub voice_amplitude: f32,
    /// Vibrato depth as a fraction of the voice frequency
    pub vibrato_depth: f32,
    pub vibrato_rate_hz: f32,
    /// Attack length as a fraction of the chord
    pub attack_fraction: f32,
    /// Release length as a fraction of the chord
    pub release_fraction: f32,
    pub attack_curve: f32,
    pub release_curve: f32,
    pub pad: Drone,
    pub shimmer: Shimmer,
    pub peak: f32,
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            chords: vec![
                // Am add G#
                Chord {
                    start: 0.5,
                    end: 4.0,
                    frequencies: vec![220.0, 261.63, 329.63, 415.30],
                },
                // Gm add F#
                Chord {
                    start: 5.0,
                    end: 8.5,
                    frequencies: vec![196.0, 246.94, 311.13, 369.99],
                },
                // Fm add E
                Chord {
                    start: 9.0,
                    end: 12.0,
                    frequencies: vec![174.61, 220.0, 277.18, 329.63],
                },
            ],
            voice_amplitude: 0.08,
            vibrato_depth: 0.02,
            vibrato_rate_hz: 5.0,
            attack_fraction: 0.4,
            release_fraction: 0.5,
            attack_curve: 1.5,
            release_curve: 2.0,
            pad: Drone {
                voices: vec![
                    Sine::new(110.0, 0.12),
                    Sine::new(165.0, 0.10),
                    // Slightly detuned octave
                    Sine::new(221.1, 0.08),
                ],
                lfo: Lfo::new(0.6, 0.4, 0.18),
            },
            shimmer: Shimmer::default(),
            peak: 0.85,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AtmosphereGenerator {
    params: AtmosphereParams,
}

impl AtmosphereGenerator {
    pub fn new(params: AtmosphereParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AtmosphereParams {
        &self.params
    }

    fn render_chord(&self, chord: &Chord, sample_rate: u32) -> Vec<f32> {
        let p = &self.params;
        let length = (chord.end - chord.start).max(0.0);
        let len = burst_len(length, sample_rate);
        let mut sound = vec![0.0_f32; len];
        for &frequency in &chord.frequencies {
            let voice = tone(
                len,
                sample_rate,
                p.voice_amplitude,
                Pitch::Wobble {
                    center: frequency,
                    depth_hz: frequency * p.vibrato_depth,
                    rate_hz: p.vibrato_rate_hz,
                },
            );
            mix_into(&mut sound, &voice, 1.0);
        }

        let envelope = Adsr::new(
            length * p.attack_fraction,
            0.0,
            1.0,
            length * p.release_fraction,
        )
        .with_curves(p.attack_curve, p.release_curve);
        Envelope::Adsr(envelope).apply(&mut sound, sample_rate);
        sound
    }
}

impl LayerGenerator for AtmosphereGenerator {
    fn kind(&self) -> LayerKind {
        LayerKind::Atmosphere
    }

    fn peak(&self) -> f32 {
        self.params.peak
    }

    fn render(&self, spec: &RenderSpec) -> AudioBuffer {
        let sr = spec.sample_rate;
        let n = spec.num_samples();
        let mut out = vec![0.0_f32; n];

        for chord in &self.params.chords {
            let sound = self.render_chord(chord, sr);
            place(&mut out, sr, chord.start, &sound);
        }

        mix_into(&mut out, &self.params.pad.render(n, sr), 1.0);

        let shimmer = &self.params.shimmer;
        let mut high = tone(n, sr, shimmer.amplitude, shimmer.pitch);
        modulate(&mut high, sr, shimmer.lfo, 0.0);
        mix_into(&mut out, &high, 1.0);

        AudioBuffer::new(out, sr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::spectrum::Spectrum;

    #[test]
    fn test_atmosphere_is_continuous() {
        let spec = RenderSpec::new(4.0, 16000);
        let layer = AtmosphereGenerator::default().generate(&spec).unwrap();
        // The pad never stops, so every 100 ms window carries signal
        for window in layer.buffer.windows(1600, 1600) {
            assert!(crate::engine::buffer::rms(window) > 0.01);
        }
    }

    #[test]
    fn test_shimmer_reaches_high_band() {
        let spec = RenderSpec::new(3.0, 16000);
        let layer = AtmosphereGenerator::default().generate(&spec).unwrap();
        let spectrum = Spectrum::compute(layer.buffer.samples(), 16000);
        assert!(spectrum.band_sum(1400.0, 2200.0) > 0.0);
        assert!(spectrum.band_sum(100.0, 500.0) > spectrum.band_sum(20.0, 60.0));
    }

    #[test]
    fn test_chord_envelope_starts_and_ends_quiet() {
        let generator = AtmosphereGenerator::default();
        let chord = &generator.params().chords[0];
        let sound = generator.render_chord(chord, 8000);
        assert_eq!(sound.len(), 28000);
        assert!(sound[0].abs() < 1e-6);
        assert!(sound[27999].abs() < 1e-3);
        let middle_peak = crate::engine::buffer::peak(&sound[11200..14000]);
        assert!(middle_peak > 0.1);
    }
}
