//! Bass layer: sub-bass drone, deep rumble, thunder and a heartbeat
//!
//! The bass layer is the only one that reaches the mix unfiltered, so it
//! owns everything below the mixer's high-pass cutoff. The heartbeat is the
//! loudest recurring transient of the mix and sets its pacing.

use serde::{Deserialize, Serialize};

use super::{Drone, LayerGenerator, LayerKind};
use crate::config::RenderSpec;
use crate::engine::AudioBuffer;
use crate::synth::{
    burst_len, mix_into, place, sines, tone, Envelope, Lfo, NoiseSource, Pitch, Sine,
};

/// Enveloped low-frequency bursts with a noise texture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thunder {
    /// Start offsets in seconds
    pub times: Vec<f32>,
    pub length_secs: f32,
    pub voices: Vec<Sine>,
    /// Amplitude of the white-noise texture
    pub noise: f32,
    pub envelope: Envelope,
    pub gain: f32,
}

impl Default for Thunder {
    fn default() -> Self {
        Self {
            times: vec![2.5, 7.0, 10.5],
            length_secs: 1.5,
            voices: vec![
                Sine::new(30.0, 0.4),
                Sine::new(38.0, 0.3),
                Sine::new(45.0, 0.25),
            ],
            noise: 0.15,
            envelope: Envelope::Gaussian {
                center: 0.6,
                width: 0.4,
            },
            gain: 0.6,
        }
    }
}

/// Paired "lub-dub" thumps falling from the bass band into the sub-bass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heartbeat {
    /// Start offsets in seconds
    pub times: Vec<f32>,
    pub length_secs: f32,
    pub pitch: Pitch,
    pub amplitude: f32,
    pub decay: f32,
}

impl Default for Heartbeat {
    fn default() -> Self {
        // A pair every two seconds
        let times = (0..6)
            .flat_map(|beat| {
                let start = 0.9 + 2.0 * beat as f32;
                [start, start + 0.3]
            })
            .collect();
        Self {
            times,
            length_secs: 0.3,
            pitch: Pitch::Glide {
                start: 110.0,
                end: 60.0,
                curve: 1.0,
            },
            amplitude: 2.0,
            decay: 12.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BassParams {
    /// Sub-bass drone (30-55 Hz) breathing slowly
    pub drone: Drone,
    /// Deeper rumble (25-40 Hz) swelling more slowly still
    pub rumble: Drone,
    pub thunder: Thunder,
    pub heartbeat: Heartbeat,
    pub peak: f32,
}

impl Default for BassParams {
    fn default() -> Self {
        Self {
            drone: Drone {
                voices: vec![
                    Sine::new(35.0, 0.35),
                    Sine::new(42.0, 0.32),
                    Sine::new(48.0, 0.28),
                    Sine::new(54.0, 0.25),
                ],
                lfo: Lfo::new(0.75, 0.25, 0.12),
            },
            rumble: Drone {
                voices: vec![Sine::new(28.0, 0.25), Sine::new(32.0, 0.20)],
                lfo: Lfo::new(0.6, 0.4, 0.08),
            },
            thunder: Thunder::default(),
            heartbeat: Heartbeat::default(),
            peak: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BassGenerator {
    params: BassParams,
}

impl BassGenerator {
    pub fn new(params: BassParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &BassParams {
        &self.params
    }
}

impl LayerGenerator for BassGenerator {
    fn kind(&self) -> LayerKind {
        LayerKind::Bass
    }

    fn peak(&self) -> f32 {
        self.params.peak
    }

    fn render(&self, spec: &RenderSpec) -> AudioBuffer {
        let sr = spec.sample_rate;
        let n = spec.num_samples();
        let mut out = vec![0.0_f32; n];

        mix_into(&mut out, &self.params.drone.render(n, sr), 1.0);
        mix_into(&mut out, &self.params.rumble.render(n, sr), 1.0);

        let thunder = &self.params.thunder;
        let len = burst_len(thunder.length_secs, sr);
        let mut noise = NoiseSource::new(spec.seed, "bass/thunder");
        for &time in &thunder.times {
            let mut burst = sines(len, sr, &thunder.voices);
            mix_into(&mut burst, &noise.white(len), thunder.noise);
            thunder.envelope.apply(&mut burst, sr);
            burst.iter_mut().for_each(|s| *s *= thunder.gain);
            place(&mut out, sr, time, &burst);
        }

        let heartbeat = &self.params.heartbeat;
        let mut thump = tone(
            burst_len(heartbeat.length_secs, sr),
            sr,
            heartbeat.amplitude,
            heartbeat.pitch,
        );
        Envelope::ExpDecay {
            rate: heartbeat.decay,
        }
        .apply(&mut thump, sr);
        for &time in &heartbeat.times {
            place(&mut out, sr, time, &thump);
        }

        AudioBuffer::new(out, sr)
    }
}
